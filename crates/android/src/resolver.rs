//! Signing resolver
//!
//! Loads the four signing secrets, checks them for completeness, and decides
//! whether the release identity can be used. Resolution never fails: every
//! kind of incompleteness degrades to `usable = false`, and exactly one
//! diagnostic line is logged either way.

use crate::credentials::{load_value, Lookup, SigningKey};
use crate::identity::SigningIdentity;
use crate::secret::Secret;
use serde::Serialize;
use signkit_core::paths;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Options for [`resolve`]
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Require the store path to name an existing file
    pub strict_store_check: bool,
    /// Directory relative store paths are resolved against (the app module)
    pub base_dir: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strict_store_check: true,
            base_dir: PathBuf::from("."),
        }
    }
}

/// Why a present store path was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreProblem {
    NotFound,
    NotAFile,
}

impl fmt::Display for StoreProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("keystore not found"),
            Self::NotAFile => f.write_str("keystore path is not a file"),
        }
    }
}

/// Outcome of one resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub identity: SigningIdentity,
    pub usable: bool,
    /// Keys that were absent or empty
    pub missing: Vec<SigningKey>,
    /// Set only under strict checking when the store path is unusable
    pub store_problem: Option<StoreProblem>,
    /// Where each found key came from; values are never recorded here
    pub sources: BTreeMap<SigningKey, String>,
    pub strict: bool,
}

impl Resolution {
    /// One human-readable line describing the chosen signing path
    pub fn diagnostic(&self) -> String {
        if self.usable {
            let alias = self.identity.key_alias.as_deref().unwrap_or_default();
            let store = self
                .identity
                .store_file()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return format!("Using release signing config (alias '{alias}', keystore {store})");
        }

        let mut reasons = Vec::new();
        if !self.missing.is_empty() {
            let names: Vec<&str> = self.missing.iter().map(|k| k.name()).collect();
            reasons.push(format!("missing: {}", names.join(", ")));
        }
        if let (Some(problem), Some(path)) = (self.store_problem, self.identity.store_file()) {
            reasons.push(format!("{problem}: {}", path.display()));
        }

        format!(
            "Release signing config is incomplete, using debug signing ({})",
            reasons.join("; ")
        )
    }
}

/// Resolve the release signing identity
///
/// `env` takes precedence over `props` for every key; see
/// [`load_value`] for how empty and unreadable values are treated.
pub fn resolve(env: &dyn Lookup, props: &dyn Lookup, options: &ResolveOptions) -> Resolution {
    let mut sources = BTreeMap::new();
    let mut take = |key: SigningKey| {
        load_value(key, env, props).map(|found| {
            sources.insert(key, found.origin);
            found.value
        })
    };

    let key_alias = take(SigningKey::KeyAlias);
    let key_password = take(SigningKey::KeyPassword).map(Secret::new);
    let store_file = take(SigningKey::StorePath)
        .filter(|raw| !raw.is_empty())
        .map(|raw| paths::expand_path(&raw, &options.base_dir));
    let store_password = take(SigningKey::StorePassword).map(Secret::new);

    let identity = SigningIdentity {
        key_alias,
        key_password,
        store_file,
        store_password,
    };

    let missing = identity.missing_keys();
    let store_problem = if options.strict_store_check {
        identity.store_file().and_then(|path| {
            if !path.exists() {
                Some(StoreProblem::NotFound)
            } else if !path.is_file() {
                Some(StoreProblem::NotAFile)
            } else {
                None
            }
        })
    } else {
        None
    };

    let usable = missing.is_empty() && store_problem.is_none();

    let resolution = Resolution {
        identity,
        usable,
        missing,
        store_problem,
        sources,
        strict: options.strict_store_check,
    };

    if resolution.usable {
        tracing::info!("{}", resolution.diagnostic());
    } else {
        tracing::warn!("{}", resolution.diagnostic());
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::MapLookup;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn keystore() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.jks");
        std::fs::write(&path, b"\xFE\xED\xFE\xED").unwrap();
        (dir, path)
    }

    fn full_env(store: &std::path::Path) -> MapLookup {
        MapLookup::new("environment")
            .with("SIGNING_KEY_ALIAS", "upload")
            .with("SIGNING_KEY_PASSWORD", "key-pw")
            .with("SIGNING_STORE_PATH", store.to_string_lossy())
            .with("SIGNING_STORE_PASSWORD", "store-pw")
    }

    fn empty() -> MapLookup {
        MapLookup::new("none")
    }

    #[test]
    fn test_all_present_and_store_exists_is_usable() {
        let (_dir, store) = keystore();
        let resolution = resolve(&full_env(&store), &empty(), &ResolveOptions::default());

        assert!(resolution.usable);
        assert!(resolution.missing.is_empty());
        assert_eq!(resolution.identity.key_alias.as_deref(), Some("upload"));
        assert_eq!(resolution.identity.key_password.as_ref().unwrap().expose(), "key-pw");
        assert_eq!(resolution.identity.store_file(), Some(store.as_path()));
        assert_eq!(resolution.identity.store_password.as_ref().unwrap().expose(), "store-pw");
        assert!(resolution.diagnostic().starts_with("Using release signing config"));
    }

    #[test]
    fn test_each_missing_key_makes_it_unusable() {
        let (_dir, store) = keystore();
        for key in SigningKey::ALL {
            let mut env = full_env(&store);
            env.insert(key.name(), "");

            let resolution = resolve(&env, &empty(), &ResolveOptions::default());
            assert!(!resolution.usable, "{key} empty should be unusable");
            assert_eq!(resolution.missing, vec![key]);
            assert!(resolution.diagnostic().contains(key.name()));
        }
    }

    #[test]
    fn test_missing_store_file_strict() {
        let dir = tempfile::tempdir().unwrap();
        let env = full_env(&dir.path().join("absent.jks"));

        let resolution = resolve(&env, &empty(), &ResolveOptions::default());
        assert!(!resolution.usable);
        assert!(resolution.missing.is_empty());
        assert_eq!(resolution.store_problem, Some(StoreProblem::NotFound));
        assert!(resolution.diagnostic().contains("keystore not found"));
    }

    #[test]
    fn test_directory_as_store_strict() {
        let dir = tempfile::tempdir().unwrap();
        let env = full_env(dir.path());

        let resolution = resolve(&env, &empty(), &ResolveOptions::default());
        assert_eq!(resolution.store_problem, Some(StoreProblem::NotAFile));
        assert!(!resolution.usable);
    }

    #[test]
    fn test_missing_store_file_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let env = full_env(&dir.path().join("absent.jks"));
        let options = ResolveOptions {
            strict_store_check: false,
            ..ResolveOptions::default()
        };

        let resolution = resolve(&env, &empty(), &options);
        assert!(resolution.usable);
        assert!(resolution.store_problem.is_none());
    }

    #[test]
    fn test_relative_store_path_uses_base_dir() {
        let (dir, _store) = keystore();
        let env = full_env(std::path::Path::new("upload.jks"));
        let options = ResolveOptions {
            base_dir: dir.path().to_path_buf(),
            ..ResolveOptions::default()
        };

        let resolution = resolve(&env, &empty(), &options);
        assert!(resolution.usable);
        assert_eq!(resolution.identity.store_file(), Some(dir.path().join("upload.jks").as_path()));
    }

    #[test]
    fn test_properties_fill_gaps() {
        let (_dir, store) = keystore();
        let env = MapLookup::new("environment").with("SIGNING_KEY_ALIAS", "upload");
        let props = MapLookup::new("gradle.properties")
            .with("SIGNING_KEY_PASSWORD", "key-pw")
            .with("SIGNING_STORE_PATH", store.to_string_lossy())
            .with("SIGNING_STORE_PASSWORD", "store-pw");

        let resolution = resolve(&env, &props, &ResolveOptions::default());
        assert!(resolution.usable);
        assert_eq!(resolution.sources[&SigningKey::KeyAlias], "environment");
        assert_eq!(resolution.sources[&SigningKey::StorePassword], "gradle.properties");
    }

    #[test]
    fn test_nothing_configured() {
        let resolution = resolve(&empty(), &empty(), &ResolveOptions::default());

        assert!(!resolution.usable);
        assert!(resolution.identity.is_empty());
        assert_eq!(resolution.missing.len(), 4);
        assert!(resolution.sources.is_empty());
        assert!(resolution.diagnostic().contains("using debug signing"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (_dir, store) = keystore();
        let env = full_env(&store);
        let options = ResolveOptions::default();

        assert_eq!(resolve(&env, &empty(), &options), resolve(&env, &empty(), &options));
    }

    #[test]
    fn test_serialized_resolution_has_no_secrets() {
        let (_dir, store) = keystore();
        let resolution = resolve(&full_env(&store), &empty(), &ResolveOptions::default());

        let json = serde_json::to_string(&resolution).unwrap();
        assert!(!json.contains("key-pw"));
        assert!(!json.contains("store-pw"));
        assert!(json.contains("\"SIGNING_KEY_ALIAS\":\"environment\""));
    }

    proptest! {
        #[test]
        fn env_always_overrides_properties(
            key_idx in 0usize..4,
            env_value in "[a-zA-Z0-9]{1,16}",
            prop_value in "[a-zA-Z0-9]{1,16}",
        ) {
            let key = SigningKey::ALL[key_idx];
            let env = MapLookup::new("environment").with(key.name(), env_value.clone());
            let props = MapLookup::new("gradle.properties").with(key.name(), prop_value);
            let options = ResolveOptions {
                strict_store_check: false,
                base_dir: PathBuf::from("/base"),
            };

            let resolution = resolve(&env, &props, &options);
            let identity = &resolution.identity;
            let got = match key {
                SigningKey::KeyAlias => identity.key_alias.clone(),
                SigningKey::KeyPassword => identity.key_password.as_ref().map(|s| s.expose().to_string()),
                SigningKey::StorePath => identity
                    .store_file()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned()),
                SigningKey::StorePassword => identity.store_password.as_ref().map(|s| s.expose().to_string()),
            };
            prop_assert_eq!(got, Some(env_value));
            prop_assert_eq!(resolution.sources.get(&key).map(String::as_str), Some("environment"));
        }
    }
}
