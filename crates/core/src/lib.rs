//! Core utilities for signkit
//!
//! Shared functionality used by the Android signing resolver and the CLI:
//!
//! - **Error handling**: structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based `.signkit.toml` with validation
//! - **Properties files**: Java `.properties` parsing for Gradle property stores
//! - **Process execution**: running `gradlew` and `keytool` with captured or streamed output
//!
//! # Example
//!
//! ```rust,no_run
//! use signkit_core::{config::Config, properties::Properties};
//!
//! let config = Config::load(None).expect("invalid config");
//! let props = Properties::load("android/gradle.properties").expect("unreadable");
//! println!("{:?} {:?}", config.schema.signing.shrink_policy, props.get("org.gradle.jvmargs"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod paths;
pub mod process;
pub mod properties;

pub use error::{Error, ErrorCode, Result, ResultExt};

