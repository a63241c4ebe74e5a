//! Android release-signing resolution for signkit
//!
//! This crate decides how a Flutter app's Android release build is signed:
//! - Credential lookup from the environment with Gradle property fallback
//! - Completeness checking and release/debug signing selection
//! - Build variant packaging flags (shrink/minify)
//! - Debug keystore discovery
//! - Repository mirrors and pinned toolchain settings
//! - Gradle, `key.properties` and `keytool` integration
//!
//! # Example
//!
//! ```rust,no_run
//! use signkit_android::project::Project;
//! use signkit_android::variant::BuildKind;
//! use signkit_core::config::ConfigSchema;
//!
//! let project = Project::new("android", ConfigSchema::default());
//! let resolution = project.resolve();
//! let release = project.variant(BuildKind::Release, &resolution);
//! println!("{} minify={}", resolution.diagnostic(), release.minify);
//! ```

pub mod credentials;
pub mod debug_keystore;
pub mod gradle;
pub mod identity;
pub mod key_properties;
pub mod keystore;
pub mod project;
pub mod property_store;
pub mod repositories;
pub mod resolver;
pub mod secret;
pub mod toolchain;
pub mod variant;

pub use credentials::{Lookup, ProcessEnv, SigningKey};
pub use identity::SigningIdentity;
pub use resolver::{resolve, Resolution, ResolveOptions};
pub use secret::Secret;
pub use variant::{select_variant, BuildKind, SigningChoice, VariantConfig};
