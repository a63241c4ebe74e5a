//! Release signing identity

use crate::credentials::SigningKey;
use crate::secret::Secret;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The (keystore, alias, two passwords) tuple used to sign a release package
///
/// Built once per resolution from whatever values were found; any field may
/// be absent. Never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SigningIdentity {
    pub key_alias: Option<String>,
    pub key_password: Option<Secret>,
    pub store_file: Option<PathBuf>,
    pub store_password: Option<Secret>,
}

impl SigningIdentity {
    /// Keys whose value is absent or empty, in reporting order
    pub fn missing_keys(&self) -> Vec<SigningKey> {
        SigningKey::ALL
            .into_iter()
            .filter(|&key| !self.has(key))
            .collect()
    }

    /// Whether all four fields carry a non-empty value
    pub fn is_complete(&self) -> bool {
        SigningKey::ALL.into_iter().all(|key| self.has(key))
    }

    /// Whether `key` carries a non-empty value
    pub fn has(&self, key: SigningKey) -> bool {
        match key {
            SigningKey::KeyAlias => self.key_alias.as_deref().is_some_and(|s| !s.is_empty()),
            SigningKey::KeyPassword => self.key_password.as_ref().is_some_and(|s| !s.is_empty()),
            SigningKey::StorePath => self
                .store_file
                .as_deref()
                .is_some_and(|p| !p.as_os_str().is_empty()),
            SigningKey::StorePassword => {
                self.store_password.as_ref().is_some_and(|s| !s.is_empty())
            }
        }
    }

    pub fn store_file(&self) -> Option<&Path> {
        self.store_file.as_deref()
    }

    /// Whether every field is absent
    pub fn is_empty(&self) -> bool {
        self.key_alias.is_none()
            && self.key_password.is_none()
            && self.store_file.is_none()
            && self.store_password.is_none()
    }
}
