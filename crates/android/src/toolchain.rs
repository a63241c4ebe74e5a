//! Pinned toolchain settings
//!
//! Values the app and every subproject must agree on: Java/Kotlin target,
//! NDK, minimum SDK, and the relocated build directory.

use serde::Serialize;
use signkit_core::config::ToolchainConfig;

/// Toolchain settings rendered for Gradle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    pub namespace: String,
    pub application_id: String,
    pub min_sdk: u32,
    pub ndk_version: String,
    pub jvm_target: u32,
    pub build_dir: String,
}

impl From<&ToolchainConfig> for Toolchain {
    fn from(config: &ToolchainConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            application_id: config
                .application_id
                .clone()
                .unwrap_or_else(|| config.namespace.clone()),
            min_sdk: config.min_sdk,
            ndk_version: config.ndk_version.clone(),
            jvm_target: config.jvm_target,
            build_dir: config.build_dir.clone(),
        }
    }
}

impl Toolchain {
    /// `JavaVersion` constant name for the target, e.g. `VERSION_17`
    pub fn java_version(&self) -> String {
        if self.jvm_target <= 8 {
            format!("VERSION_1_{}", self.jvm_target)
        } else {
            format!("VERSION_{}", self.jvm_target)
        }
    }

    /// Kotlin `jvmTarget` string; Java 8 is spelled `1.8`
    pub fn kotlin_jvm_target(&self) -> String {
        if self.jvm_target <= 8 {
            format!("1.{}", self.jvm_target)
        } else {
            self.jvm_target.to_string()
        }
    }

    /// Ordered `name=value` pairs suitable for `gradle.properties` or `-P`
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("signkit.namespace", self.namespace.clone()),
            ("signkit.applicationId", self.application_id.clone()),
            ("signkit.minSdk", self.min_sdk.to_string()),
            ("signkit.ndkVersion", self.ndk_version.clone()),
            ("signkit.javaVersion", self.java_version()),
            ("signkit.jvmTarget", self.kotlin_jvm_target()),
            ("signkit.buildDir", self.build_dir.clone()),
        ]
    }
}
