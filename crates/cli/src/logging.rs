//! Tracing subscriber setup
//!
//! Library crates only emit `tracing` events; the binary installs the
//! subscriber once, writing compact lines to stderr.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "SIGNKIT_LOG";

/// Logging options collected from flags and config
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level from the config file
    pub default_level: String,
    /// `-v` count
    pub verbose: u8,
    /// `-q`
    pub quiet: bool,
    /// Include event targets in output
    pub show_target: bool,
    /// Emit ANSI colors
    pub ansi: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            default_level: "warn".to_string(),
            verbose: 0,
            quiet: false,
            show_target: false,
            ansi: true,
        }
    }
}

/// Pick the effective level from flags, falling back to the configured one
pub fn effective_level(options: &LogOptions) -> String {
    if options.quiet {
        return "error".to_string();
    }
    match options.verbose {
        0 => options.default_level.to_ascii_lowercase(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber
pub fn init(options: &LogOptions) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(effective_level(options)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(options.show_target)
            .with_ansi(options.ansi)
            .without_time()
            .compact(),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Logging initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins_over_verbose() {
        let options = LogOptions {
            verbose: 3,
            quiet: true,
            ..LogOptions::default()
        };
        assert_eq!(effective_level(&options), "error");
    }

    #[test]
    fn test_verbosity_steps() {
        let mut options = LogOptions::default();
        assert_eq!(effective_level(&options), "warn");
        options.verbose = 1;
        assert_eq!(effective_level(&options), "info");
        options.verbose = 2;
        assert_eq!(effective_level(&options), "debug");
        options.verbose = 9;
        assert_eq!(effective_level(&options), "trace");
    }

    #[test]
    fn test_config_level_used_without_flags() {
        let options = LogOptions {
            default_level: "INFO".to_string(),
            ..LogOptions::default()
        };
        assert_eq!(effective_level(&options), "info");
    }
}
