//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Status lines go to
//! stderr so stdout stays clean for piped output (`gradle-args`, `--json`).
//! Colors are applied only when the target stream supports them, which
//! honours `NO_COLOR`, non-TTY output and `owo_colors::set_override`.

use owo_colors::{OwoColorize, Stream};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".if_supports_color(Stream::Stderr, |t| t.green()), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".if_supports_color(Stream::Stderr, |t| t.red()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".if_supports_color(Stream::Stderr, |t| t.blue()), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Print an aligned `label: value` row
pub fn field(label: &str, value: &str) {
    let label = format!("{label}:");
    println!(
        "  {:<16} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Render an optional value, marking absence
pub fn or_missing(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "(missing)".to_string(),
    }
}

/// Render a boolean as yes/no
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}
