//! Build variant selection
//!
//! Turns a [`Resolution`] into the signing identity and packaging flags
//! for the `release` or `debug` build type.

use crate::debug_keystore::DebugIdentity;
use crate::identity::SigningIdentity;
use crate::resolver::Resolution;
use crate::secret::Secret;
use serde::Serialize;
use signkit_core::config::ShrinkPolicy;
use signkit_core::error::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default R8 rules shipped with the Android Gradle plugin
pub const DEFAULT_PROGUARD_FILE: &str = "proguard-android-optimize.txt";
/// Project-specific R8 rules in the app module
pub const PROJECT_PROGUARD_FILE: &str = "proguard-rules.pro";

/// Android build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Release,
    Debug,
}

impl BuildKind {
    /// Gradle task name suffix (`assembleRelease`, `bundleDebug`, ...)
    pub fn task_suffix(self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => f.write_str("release"),
            Self::Debug => f.write_str("debug"),
        }
    }
}

impl FromStr for BuildKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "debug" => Ok(Self::Debug),
            other => Err(Error::invalid_argument(format!(
                "Unknown build type '{other}' (expected release or debug)"
            ))),
        }
    }
}

/// Identity that will sign the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SigningChoice {
    Release(SigningIdentity),
    Debug(DebugIdentity),
}

impl SigningChoice {
    pub fn is_release(&self) -> bool {
        matches!(self, Self::Release(_))
    }

    pub fn store_file(&self) -> Option<&Path> {
        match self {
            Self::Release(identity) => identity.store_file(),
            Self::Debug(debug) => Some(&debug.store_file),
        }
    }

    pub fn key_alias(&self) -> Option<&str> {
        match self {
            Self::Release(identity) => identity.key_alias.as_deref(),
            Self::Debug(debug) => Some(&debug.key_alias),
        }
    }

    pub fn store_password(&self) -> Option<&Secret> {
        match self {
            Self::Release(identity) => identity.store_password.as_ref(),
            Self::Debug(debug) => Some(&debug.store_password),
        }
    }

    pub fn key_password(&self) -> Option<&Secret> {
        match self {
            Self::Release(identity) => identity.key_password.as_ref(),
            Self::Debug(debug) => Some(&debug.key_password),
        }
    }
}

/// Signing identity and packaging flags for one build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantConfig {
    pub kind: BuildKind,
    pub signing: SigningChoice,
    pub minify: bool,
    pub shrink_resources: bool,
    pub proguard_files: Vec<String>,
    pub debuggable: bool,
}

/// Select the signing identity and packaging flags for `kind`
///
/// A release build falls back to debug signing when the resolution is not
/// usable; with [`ShrinkPolicy::WhenSigned`] it then also skips
/// shrinking so no obfuscated artifact is produced without a release key.
pub fn select_variant(
    kind: BuildKind,
    resolution: &Resolution,
    debug: &DebugIdentity,
    policy: ShrinkPolicy,
) -> VariantConfig {
    match kind {
        BuildKind::Debug => VariantConfig {
            kind,
            signing: SigningChoice::Debug(debug.clone()),
            minify: false,
            shrink_resources: false,
            proguard_files: Vec::new(),
            debuggable: true,
        },
        BuildKind::Release => {
            let signing = if resolution.usable {
                SigningChoice::Release(resolution.identity.clone())
            } else {
                SigningChoice::Debug(debug.clone())
            };

            let shrink = match policy {
                ShrinkPolicy::Always => true,
                ShrinkPolicy::WhenSigned => resolution.usable,
            };

            let proguard_files = if shrink {
                vec![
                    DEFAULT_PROGUARD_FILE.to_string(),
                    PROJECT_PROGUARD_FILE.to_string(),
                ]
            } else {
                Vec::new()
            };

            tracing::debug!(
                signing = if signing.is_release() { "release" } else { "debug" },
                shrink,
                ?policy,
                "Selected release variant"
            );

            VariantConfig {
                kind,
                signing,
                minify: shrink,
                shrink_resources: shrink,
                proguard_files,
                debuggable: false,
            }
        }
    }
}
