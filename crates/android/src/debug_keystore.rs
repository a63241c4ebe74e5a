//! Debug signing identity
//!
//! The Android Gradle plugin signs debug builds with a keystore it creates
//! on first use. Its alias and passwords are fixed.

use crate::secret::Secret;
use serde::Serialize;
use signkit_core::paths;
use std::path::{Path, PathBuf};

/// Alias of the key inside the debug keystore
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";
/// Store and key password of the debug keystore
pub const DEBUG_PASSWORD: &str = "android";
/// File name of the debug keystore
pub const DEBUG_KEYSTORE_FILE: &str = "debug.keystore";

/// Locally generated, non-distributable signing identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugIdentity {
    pub store_file: PathBuf,
    pub key_alias: String,
    pub store_password: Secret,
    pub key_password: Secret,
}

impl DebugIdentity {
    /// Debug identity backed by the keystore at `store_file`
    pub fn at(store_file: impl Into<PathBuf>) -> Self {
        Self {
            store_file: store_file.into(),
            key_alias: DEBUG_KEY_ALIAS.to_string(),
            store_password: Secret::new(DEBUG_PASSWORD),
            key_password: Secret::new(DEBUG_PASSWORD),
        }
    }

    /// Find the debug keystore
    ///
    /// Uses `configured` when given (expanded, relative to `base`), else
    /// `$ANDROID_USER_HOME/debug.keystore`, else `~/.android/debug.keystore`.
    pub fn locate(configured: Option<&str>, android_user_home: Option<&str>, base: &Path) -> Self {
        if let Some(raw) = configured.filter(|s| !s.is_empty()) {
            return Self::at(paths::expand_path(raw, base));
        }

        let dir = paths::android_user_home(android_user_home)
            .unwrap_or_else(|| base.join(".android"));
        Self::at(dir.join(DEBUG_KEYSTORE_FILE))
    }

    /// Whether the keystore file has been generated yet
    pub fn exists(&self) -> bool {
        self.store_file.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_credentials() {
        let debug = DebugIdentity::at("/tmp/debug.keystore");
        assert_eq!(debug.key_alias, "androiddebugkey");
        assert_eq!(debug.store_password.expose(), "android");
        assert_eq!(debug.key_password.expose(), "android");
    }

    #[test]
    fn test_configured_path_wins() {
        let debug = DebugIdentity::locate(Some("keys/debug.jks"), Some("/ignored"), Path::new("/proj"));
        assert_eq!(debug.store_file, PathBuf::from("/proj/keys/debug.jks"));
    }

    #[test]
    fn test_android_user_home_override() {
        let debug = DebugIdentity::locate(None, Some("/opt/android-home"), Path::new("/proj"));
        assert_eq!(debug.store_file, PathBuf::from("/opt/android-home/debug.keystore"));
    }

    #[test]
    fn test_exists_checks_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.keystore");
        let debug = DebugIdentity::at(&path);
        assert!(!debug.exists());

        std::fs::write(&path, b"\xFE\xED\xFE\xED").unwrap();
        assert!(debug.exists());
    }
}
