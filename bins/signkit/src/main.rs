//! signkit CLI
//!
//! Resolves how a Flutter app's Android release build is signed and hands
//! the result to Gradle.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use signkit_android::gradle::{self, BuildRequest};
use signkit_android::project::Project;
use signkit_android::repositories;
use signkit_android::{key_properties, keystore, BuildKind, Resolution, SigningKey};
use signkit_cli::logging::{self, LogOptions};
use signkit_cli::output::{self, Status};
use signkit_cli::progress;
use signkit_core::config::Config;
use signkit_core::error::{exit_codes, ErrorCode};
use signkit_core::process::command_exists;
use signkit_core::properties::{self, Properties};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "signkit")]
#[command(about = "Resolve Android release signing for Flutter builds")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Android project directory (defaults to general.android_dir, else ".")
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Project property override, as for gradle -P
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", value_parser = parse_property, global = true)]
    properties: Vec<(String, String)>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved release signing identity (passwords redacted)
    Resolve {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Skip the keystore existence check
        #[arg(long)]
        lenient: bool,
    },

    /// Report whether release signing is usable
    Check {
        /// Exit with status 2 when falling back to debug signing
        #[arg(long)]
        require_release: bool,
    },

    /// Show signing and packaging settings for a build type
    Variant {
        /// Build type: release or debug
        #[arg(default_value = "release")]
        kind: BuildKind,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print -P arguments that apply the selected signing to Gradle
    #[command(name = "gradle-args")]
    GradleArgs {
        /// Build type: release or debug
        #[arg(default_value = "release")]
        kind: BuildKind,
    },

    /// Write key.properties for the release identity
    #[command(name = "key-properties")]
    KeyProperties {
        /// Output path (defaults to <project-dir>/key.properties)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List Maven repositories in lookup order
    Repos {
        /// Render a Kotlin DSL repositories block
        #[arg(long)]
        kotlin: bool,
    },

    /// Print pinned toolchain settings as Gradle properties
    Toolchain {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run Gradle with the selected signing
    Build {
        /// Build type: release or debug
        #[arg(default_value = "release")]
        kind: BuildKind,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
        /// Run clean first
        #[arg(long)]
        clean: bool,
    },

    /// Check the release keystore and alias with keytool
    Verify,

    /// Diagnose environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_property(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    logging::init(&LogOptions {
        default_level: config.schema.logging.level.clone(),
        verbose: cli.verbose,
        quiet: cli.quiet,
        show_target: cli.verbose > 1,
        ansi: !cli.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stderr().is_terminal(),
    })?;

    let project_dir = cli
        .project_dir
        .clone()
        .unwrap_or_else(|| default_project_dir(&config.schema.general.android_dir));
    let overrides: Properties = cli.properties.iter().cloned().collect();
    let project = Project::new(project_dir, config.schema.clone()).with_overrides(overrides);

    let exit_code = match cli.command {
        Commands::Resolve { json, lenient } => run_resolve(&project, json, lenient),
        Commands::Check { require_release } => run_check(&project, require_release, cli.quiet),
        Commands::Variant { kind, json } => run_variant(&project, kind, json),
        Commands::GradleArgs { kind } => run_gradle_args(&project, kind),
        Commands::KeyProperties { output } => run_key_properties(&project, output.as_deref()),
        Commands::Repos { kotlin } => run_repos(&project, kotlin),
        Commands::Toolchain { json } => run_toolchain(&project, json),
        Commands::Build { kind, bundle, clean } => run_build(&project, kind, bundle, clean),
        Commands::Verify => run_verify(&project),
        Commands::Doctor { json } => run_doctor(&project, &config, json),
    };

    std::process::exit(exit_code);
}

/// The configured Android directory if present, else the current directory
fn default_project_dir(android_dir: &str) -> PathBuf {
    let configured = PathBuf::from(android_dir);
    if configured.is_dir() {
        configured
    } else {
        PathBuf::from(".")
    }
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("Failed to serialize output: {e}"));
            exit_codes::FAILURE
        }
    }
}

fn run_resolve(project: &Project, json: bool, lenient: bool) -> i32 {
    let mut options = project.resolve_options();
    if lenient {
        options.strict_store_check = false;
    }
    let resolution = project.resolve_with(&options);

    if json {
        return print_json(&resolution);
    }

    Status::header("Release signing");
    for key in SigningKey::ALL {
        let value = describe_value(&resolution, key);
        let source = resolution
            .sources
            .get(&key)
            .map(|s| format!("  ({s})"))
            .unwrap_or_default();
        output::field(key.name(), &format!("{value}{source}"));
    }
    output::field("strict check", output::yes_no(resolution.strict));
    output::field("usable", output::yes_no(resolution.usable));

    if let Some(store) = resolution.identity.store_file().filter(|p| p.is_file()) {
        match keystore::inspect(store) {
            Ok(info) => {
                output::field("keystore type", info.keystore_type.keytool_name());
                output::field("sha256", &info.sha256);
            }
            Err(e) => tracing::debug!(error = %e, "Could not inspect keystore"),
        }
    }

    exit_codes::SUCCESS
}

fn describe_value(resolution: &Resolution, key: SigningKey) -> String {
    let identity = &resolution.identity;
    if !identity.has(key) {
        return output::or_missing(None);
    }
    match key {
        SigningKey::KeyAlias => output::or_missing(identity.key_alias.as_deref()),
        SigningKey::StorePath => identity
            .store_file()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        SigningKey::KeyPassword | SigningKey::StorePassword => "********".to_string(),
    }
}

fn run_check(project: &Project, require_release: bool, quiet: bool) -> i32 {
    let resolution = project.resolve();

    if resolution.usable {
        if !quiet {
            Status::success("Release signing identity is complete");
        }
        return exit_codes::SUCCESS;
    }

    if !quiet {
        Status::warning(&resolution.diagnostic());
    }

    if require_release {
        exit_codes::SIGNING_INCOMPLETE
    } else {
        exit_codes::SUCCESS
    }
}

fn run_variant(project: &Project, kind: BuildKind, json: bool) -> i32 {
    let resolution = project.resolve();
    let variant = project.variant(kind, &resolution);

    if json {
        return print_json(&variant);
    }

    Status::header(&format!("{kind} variant"));
    output::field(
        "signing",
        if variant.signing.is_release() { "release" } else { "debug" },
    );
    output::field("key alias", &output::or_missing(variant.signing.key_alias()));
    output::field(
        "keystore",
        &variant
            .signing
            .store_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| output::or_missing(None)),
    );
    output::field("minify", output::yes_no(variant.minify));
    output::field("shrink resources", output::yes_no(variant.shrink_resources));
    output::field("debuggable", output::yes_no(variant.debuggable));
    if !variant.proguard_files.is_empty() {
        output::field("proguard files", &variant.proguard_files.join(", "));
    }

    exit_codes::SUCCESS
}

fn run_gradle_args(project: &Project, kind: BuildKind) -> i32 {
    let resolution = project.resolve();
    let variant = project.variant(kind, &resolution);

    for arg in gradle::gradle_args(&variant) {
        println!("{arg}");
    }
    exit_codes::SUCCESS
}

fn run_key_properties(project: &Project, output_path: Option<&Path>) -> i32 {
    let resolution = project.resolve();
    let path = output_path.map_or_else(
        || project.android_dir().join(key_properties::KEY_PROPERTIES_FILE),
        Path::to_path_buf,
    );

    match key_properties::write(&resolution, &path) {
        Ok(()) => {
            Status::success(&format!("Wrote {}", path.display()));
            exit_codes::SUCCESS
        }
        Err(e) if e.code == ErrorCode::IncompleteIdentity => {
            Status::error(&e.to_string());
            exit_codes::SIGNING_INCOMPLETE
        }
        Err(e) => {
            Status::error(&e.to_string());
            exit_codes::FAILURE
        }
    }
}

fn run_repos(project: &Project, kotlin: bool) -> i32 {
    let repos = project.repositories();

    if kotlin {
        print!("{}", repositories::render_kotlin_dsl(&repos));
    } else {
        for repo in &repos {
            println!("{:<14} {}", repo.name, repo.url);
        }
    }
    exit_codes::SUCCESS
}

fn run_toolchain(project: &Project, json: bool) -> i32 {
    let toolchain = project.toolchain();

    if json {
        return print_json(&toolchain);
    }

    let props = toolchain.properties();
    print!(
        "{}",
        properties::render(props.iter().map(|(k, v)| (*k, v.as_str())))
    );
    exit_codes::SUCCESS
}

fn run_build(project: &Project, kind: BuildKind, bundle: bool, clean: bool) -> i32 {
    let project_dir = project.android_dir();

    if clean {
        Status::info("Cleaning...");
        match gradle::clean(project_dir) {
            Ok(0) => {}
            Ok(code) => {
                Status::error("Clean failed");
                return code;
            }
            Err(e) => {
                Status::error(&format!("Clean failed: {e}"));
                return exit_codes::FAILURE;
            }
        }
    }

    let resolution = project.resolve();
    let variant = project.variant(kind, &resolution);

    if kind == BuildKind::Release {
        if variant.signing.is_release() {
            Status::info(&resolution.diagnostic());
        } else {
            Status::warning("Release artifact will be signed with the debug keystore");
        }
    }

    let task = gradle::task_name(kind, bundle);
    Status::info(&format!("Running {task}..."));

    let started = std::time::Instant::now();
    let result = gradle::build(&BuildRequest {
        project_dir,
        variant: &variant,
        bundle,
        extra_properties: project.overrides(),
    });

    match result {
        Ok(0) => {
            Status::success(&format!(
                "{task} succeeded in {}",
                output::format_duration(started.elapsed())
            ));
            exit_codes::SUCCESS
        }
        Ok(code) => {
            Status::error(&format!("{task} failed (exit code {code})"));
            code
        }
        Err(e) if e.code == ErrorCode::CommandNotFound => {
            Status::error(&e.to_string());
            exit_codes::COMMAND_NOT_FOUND
        }
        Err(e) => {
            Status::error(&format!("Build error: {e}"));
            exit_codes::FAILURE
        }
    }
}

fn run_verify(project: &Project) -> i32 {
    let resolution = project.resolve();

    if !resolution.usable {
        Status::error(&resolution.diagnostic());
        return exit_codes::SIGNING_INCOMPLETE;
    }

    let pb = progress::spinner("Checking keystore with keytool...");
    match keystore::verify(&resolution.identity) {
        Ok(info) => {
            progress::finish_success(&pb, "Keystore verified");
            output::field("keystore type", info.keystore_type.keytool_name());
            output::field("sha256", &info.sha256);
            exit_codes::SUCCESS
        }
        Err(e) => {
            progress::finish_error(&pb, "Keystore check failed");
            Status::error(&e.to_string());
            if e.code == ErrorCode::CommandNotFound {
                exit_codes::COMMAND_NOT_FOUND
            } else {
                exit_codes::FAILURE
            }
        }
    }
}

#[derive(Serialize)]
struct DoctorCheck {
    name: &'static str,
    ok: bool,
    required: bool,
    detail: String,
}

#[derive(Serialize)]
struct DoctorReport {
    config: Option<String>,
    project_dir: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn healthy(&self) -> bool {
        self.checks.iter().all(|c| c.ok || !c.required)
    }
}

fn run_doctor(project: &Project, config: &Config, json: bool) -> i32 {
    let wrapper = gradle::wrapper_path(project.android_dir());
    let debug = project.debug_identity();
    let resolution = project.resolve();

    let report = DoctorReport {
        config: config.path.as_ref().map(|p| p.display().to_string()),
        project_dir: project.android_dir().display().to_string(),
        checks: vec![
            DoctorCheck {
                name: "gradle wrapper",
                ok: wrapper.is_ok(),
                required: true,
                detail: match &wrapper {
                    Ok(path) => path.display().to_string(),
                    Err(e) => e.message.clone(),
                },
            },
            DoctorCheck {
                name: "keytool",
                ok: command_exists("keytool"),
                required: false,
                detail: "needed by `signkit verify`".to_string(),
            },
            DoctorCheck {
                name: "debug keystore",
                ok: debug.exists(),
                required: false,
                detail: debug.store_file.display().to_string(),
            },
            DoctorCheck {
                name: "release signing",
                ok: resolution.usable,
                required: false,
                detail: resolution.diagnostic(),
            },
        ],
    };

    if json {
        print_json(&report);
    } else {
        Status::header("signkit doctor");
        output::field("config", report.config.as_deref().unwrap_or("(defaults)"));
        output::field("project dir", &report.project_dir);
        for check in &report.checks {
            if check.ok {
                Status::success(&format!("{}: {}", check.name, check.detail));
            } else if check.required {
                Status::error(&format!("{}: {}", check.name, check.detail));
            } else {
                Status::warning(&format!("{}: {}", check.name, check.detail));
            }
        }
    }

    if report.healthy() {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}
