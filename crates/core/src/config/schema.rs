//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub repositories: RepositoriesConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Check values serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.repositories.validate()?;
        self.toolchain.validate()?;
        self.logging.validate()
    }
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Android project directory, relative to the Flutter project root
    #[serde(default = "default_android_dir")]
    pub android_dir: String,

    /// Application module inside the Android project
    #[serde(default = "default_app_module")]
    pub app_module: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            android_dir: default_android_dir(),
            app_module: default_app_module(),
        }
    }
}

fn default_android_dir() -> String {
    "android".to_string()
}

fn default_app_module() -> String {
    "app".to_string()
}

/// When to enable code shrinking and resource shrinking for release builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShrinkPolicy {
    /// Only when the release identity is usable
    #[default]
    WhenSigned,
    /// Regardless of which identity signs the artifact
    Always,
}

/// Release signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Require the keystore named by SIGNING_STORE_PATH to exist
    #[serde(default = "default_true")]
    pub strict_store_check: bool,

    /// Shrink/minify policy for release builds
    #[serde(default)]
    pub shrink_policy: ShrinkPolicy,

    /// Debug keystore override (defaults to ~/.android/debug.keystore)
    #[serde(default)]
    pub debug_keystore: Option<String>,

    /// Property files consulted after gradle.properties, relative to the Android dir
    #[serde(default = "default_properties_files")]
    pub properties_files: Vec<String>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            strict_store_check: true,
            shrink_policy: ShrinkPolicy::default(),
            debug_keystore: None,
            properties_files: default_properties_files(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_properties_files() -> Vec<String> {
    vec!["gradle.properties".to_string()]
}

/// Maven repositories offered to the dependency fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoriesConfig {
    /// Mirrors, tried before the defaults in the order listed
    #[serde(default)]
    pub mirrors: Vec<String>,

    /// Append google() and mavenCentral()
    #[serde(default = "default_true")]
    pub include_defaults: bool,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            mirrors: Vec::new(),
            include_defaults: true,
        }
    }
}

impl RepositoriesConfig {
    fn validate(&self) -> Result<()> {
        for url in &self.mirrors {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(Error::invalid_config(
                    "repositories.mirrors",
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }
        Ok(())
    }
}

/// Pinned Android toolchain settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Defaults to the namespace
    #[serde(default)]
    pub application_id: Option<String>,

    #[serde(default = "default_min_sdk")]
    pub min_sdk: u32,

    #[serde(default = "default_ndk_version")]
    pub ndk_version: String,

    /// Java source/target compatibility and Kotlin jvmTarget for every subproject
    #[serde(default = "default_jvm_target")]
    pub jvm_target: u32,

    /// Root build directory, relative to the Android project
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            application_id: None,
            min_sdk: default_min_sdk(),
            ndk_version: default_ndk_version(),
            jvm_target: default_jvm_target(),
            build_dir: default_build_dir(),
        }
    }
}

impl ToolchainConfig {
    fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() || !self.namespace.contains('.') {
            return Err(Error::invalid_config(
                "toolchain.namespace",
                format!("'{}' is not a dotted package name", self.namespace),
            ));
        }
        if self.min_sdk == 0 {
            return Err(Error::invalid_config("toolchain.min_sdk", "must be at least 1"));
        }
        if self.jvm_target < 8 {
            return Err(Error::invalid_config(
                "toolchain.jvm_target",
                format!("{} is older than Java 8", self.jvm_target),
            ));
        }
        Ok(())
    }
}

fn default_namespace() -> String {
    "run.daodao.chatmcp".to_string()
}

fn default_min_sdk() -> u32 {
    24
}

fn default_ndk_version() -> String {
    "27.0.12077973".to_string()
}

fn default_jvm_target() -> u32 {
    17
}

fn default_build_dir() -> String {
    "../../build".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither SIGNKIT_LOG nor RUST_LOG is set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(Error::invalid_config(
                "logging.level",
                format!("unknown level '{other}'"),
            )),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.signing.shrink_policy, ShrinkPolicy::WhenSigned);
        assert!(schema.signing.strict_store_check);
        assert_eq!(schema.toolchain.jvm_target, 17);
    }

    #[test]
    fn test_shrink_policy_kebab_case() {
        let schema: ConfigSchema = toml::from_str("[signing]\nshrink_policy = \"always\"\n").unwrap();
        assert_eq!(schema.signing.shrink_policy, ShrinkPolicy::Always);

        let schema: ConfigSchema =
            toml::from_str("[signing]\nshrink_policy = \"when-signed\"\n").unwrap();
        assert_eq!(schema.signing.shrink_policy, ShrinkPolicy::WhenSigned);
    }

    #[test]
    fn test_rejects_non_http_mirror() {
        let schema: ConfigSchema =
            toml::from_str("[repositories]\nmirrors = [\"file:///tmp/m2\"]\n").unwrap();
        let err = schema.validate().unwrap_err();
        assert!(err.message.contains("repositories.mirrors"));
    }

    #[test]
    fn test_rejects_old_jvm_target() {
        let schema: ConfigSchema = toml::from_str("[toolchain]\njvm_target = 6\n").unwrap();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let schema: ConfigSchema = toml::from_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(schema.validate().is_err());
    }
}
