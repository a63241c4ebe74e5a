//! Android project context
//!
//! Binds a `.signkit.toml` schema to an Android project directory and an
//! environment, and exposes the resolver, variant selector, repositories
//! and toolchain through it.

use crate::credentials::{Lookup, ProcessEnv};
use crate::debug_keystore::DebugIdentity;
use crate::property_store::PropertyStore;
use crate::repositories::{self, Repository};
use crate::resolver::{self, Resolution, ResolveOptions};
use crate::toolchain::Toolchain;
use crate::variant::{self, BuildKind, VariantConfig};
use signkit_core::config::ConfigSchema;
use signkit_core::properties::Properties;
use std::path::{Path, PathBuf};

/// An Android project plus the settings that apply to it
#[derive(Debug, Clone)]
pub struct Project<E = ProcessEnv> {
    android_dir: PathBuf,
    schema: ConfigSchema,
    overrides: Properties,
    env: E,
}

impl Project<ProcessEnv> {
    /// Project reading the real process environment
    pub fn new(android_dir: impl Into<PathBuf>, schema: ConfigSchema) -> Self {
        Self::with_env(android_dir, schema, ProcessEnv)
    }
}

impl<E: Lookup + Clone + 'static> Project<E> {
    pub fn with_env(android_dir: impl Into<PathBuf>, schema: ConfigSchema, env: E) -> Self {
        Self {
            android_dir: android_dir.into(),
            schema,
            overrides: Properties::new(),
            env,
        }
    }

    /// `-P` values that take precedence over every property file
    #[must_use]
    pub fn with_overrides(mut self, overrides: Properties) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn android_dir(&self) -> &Path {
        &self.android_dir
    }

    /// Application module directory; relative store paths resolve here
    pub fn app_dir(&self) -> PathBuf {
        self.android_dir.join(&self.schema.general.app_module)
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    pub fn overrides(&self) -> &Properties {
        &self.overrides
    }

    pub fn property_store(&self) -> PropertyStore {
        PropertyStore::for_gradle_project(
            &self.android_dir,
            &self.schema.signing.properties_files,
            self.overrides.clone(),
            self.env.clone(),
        )
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            strict_store_check: self.schema.signing.strict_store_check,
            base_dir: self.app_dir(),
        }
    }

    /// Resolve with the configured options
    pub fn resolve(&self) -> Resolution {
        self.resolve_with(&self.resolve_options())
    }

    pub fn resolve_with(&self, options: &ResolveOptions) -> Resolution {
        let props = self.property_store();
        resolver::resolve(&self.env, &props, options)
    }

    pub fn debug_identity(&self) -> DebugIdentity {
        let android_home = self
            .env
            .lookup("ANDROID_USER_HOME")
            .ok()
            .flatten()
            .map(|f| f.value);
        DebugIdentity::locate(
            self.schema.signing.debug_keystore.as_deref(),
            android_home.as_deref(),
            &self.android_dir,
        )
    }

    pub fn variant(&self, kind: BuildKind, resolution: &Resolution) -> VariantConfig {
        variant::select_variant(
            kind,
            resolution,
            &self.debug_identity(),
            self.schema.signing.shrink_policy,
        )
    }

    pub fn repositories(&self) -> Vec<Repository> {
        repositories::repositories(&self.schema.repositories)
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::from(&self.schema.toolchain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MapLookup;
    use crate::variant::SigningChoice;
    use signkit_core::config::ShrinkPolicy;

    fn android_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app/keys")).unwrap();
        std::fs::write(dir.path().join("app/keys/upload.jks"), b"\xFE\xED\xFE\xED").unwrap();
        dir
    }

    fn isolated_env(dir: &Path) -> MapLookup {
        MapLookup::new("environment")
            .with("GRADLE_USER_HOME", dir.join("gradle-home").to_string_lossy())
            .with("ANDROID_USER_HOME", dir.join("android-home").to_string_lossy())
    }

    #[test]
    fn test_store_path_relative_to_app_module() {
        let dir = android_project();
        std::fs::write(
            dir.path().join("gradle.properties"),
            "SIGNING_KEY_ALIAS=upload\nSIGNING_KEY_PASSWORD=kp\nSIGNING_STORE_PATH=keys/upload.jks\nSIGNING_STORE_PASSWORD=sp\n",
        )
        .unwrap();

        let project = Project::with_env(dir.path(), ConfigSchema::default(), isolated_env(dir.path()));
        let resolution = project.resolve();

        assert!(resolution.usable, "{}", resolution.diagnostic());
        assert_eq!(
            resolution.identity.store_file(),
            Some(dir.path().join("app/keys/upload.jks").as_path())
        );
    }

    #[test]
    fn test_overrides_beat_property_files() {
        let dir = android_project();
        std::fs::write(dir.path().join("gradle.properties"), "SIGNING_KEY_ALIAS=file\n").unwrap();

        let overrides: Properties = [("SIGNING_KEY_ALIAS", "cli")].into_iter().collect();
        let project = Project::with_env(dir.path(), ConfigSchema::default(), isolated_env(dir.path()))
            .with_overrides(overrides);

        let resolution = project.resolve();
        assert_eq!(resolution.identity.key_alias.as_deref(), Some("cli"));
        assert!(!resolution.usable);
    }

    #[test]
    fn test_key_properties_file_consulted_when_configured() {
        let dir = android_project();
        std::fs::write(
            dir.path().join("key.properties"),
            "SIGNING_KEY_ALIAS=upload\nSIGNING_KEY_PASSWORD=kp\nSIGNING_STORE_PATH=keys/upload.jks\nSIGNING_STORE_PASSWORD=sp\n",
        )
        .unwrap();

        let mut schema = ConfigSchema::default();
        schema.signing.properties_files.push("key.properties".to_string());
        let project = Project::with_env(dir.path(), schema, isolated_env(dir.path()));

        assert!(project.resolve().usable);
    }

    #[test]
    fn test_variant_uses_debug_identity_from_android_home() {
        let dir = android_project();
        let mut schema = ConfigSchema::default();
        schema.signing.shrink_policy = ShrinkPolicy::WhenSigned;
        let project = Project::with_env(dir.path(), schema, isolated_env(dir.path()));

        let resolution = project.resolve();
        let variant = project.variant(BuildKind::Release, &resolution);

        match variant.signing {
            SigningChoice::Debug(debug) => {
                assert_eq!(debug.store_file, dir.path().join("android-home/debug.keystore"));
            }
            SigningChoice::Release(_) => panic!("expected debug fallback"),
        }
        assert!(!variant.minify);
    }
}
