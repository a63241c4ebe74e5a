//! Credential lookup
//!
//! The four signing secrets are read by name from the process environment,
//! falling back to Gradle project properties.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// One of the four signing secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum SigningKey {
    KeyAlias,
    KeyPassword,
    StorePath,
    StorePassword,
}

impl SigningKey {
    /// All keys, in reporting order
    pub const ALL: [SigningKey; 4] = [
        SigningKey::KeyAlias,
        SigningKey::KeyPassword,
        SigningKey::StorePath,
        SigningKey::StorePassword,
    ];

    /// Environment variable and property name
    pub fn name(self) -> &'static str {
        match self {
            Self::KeyAlias => "SIGNING_KEY_ALIAS",
            Self::KeyPassword => "SIGNING_KEY_PASSWORD",
            Self::StorePath => "SIGNING_STORE_PATH",
            Self::StorePassword => "SIGNING_STORE_PASSWORD",
        }
    }

    /// Whether the value must be redacted in output
    pub fn is_secret(self) -> bool {
        matches!(self, Self::KeyPassword | Self::StorePassword)
    }
}

impl From<SigningKey> for &'static str {
    fn from(key: SigningKey) -> Self {
        key.name()
    }
}

impl fmt::Display for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub value: String,
    /// Human-readable origin, e.g. `environment` or a file path
    pub origin: String,
}

impl Found {
    pub fn new(value: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: origin.into(),
        }
    }
}

/// Lookup failures. The resolver treats every one of them as "missing".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{name} is set but is not valid UTF-8")]
    NotUnicode { name: String },

    #[error("{name} could not be read from {origin}: {reason}")]
    Unreadable {
        name: String,
        origin: String,
        reason: String,
    },
}

/// Key-value source for signing secrets
pub trait Lookup {
    /// Look up `name`; `Ok(None)` when absent
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError>;
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        (**self).lookup(name)
    }
}

/// The current process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(Found::new(value, "environment"))),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(LookupError::NotUnicode {
                name: name.to_string(),
            }),
        }
    }
}

/// In-memory lookup, for embedding callers and tests
#[derive(Debug, Clone, Default)]
pub struct MapLookup {
    values: HashMap<String, String>,
    origin: String,
}

impl MapLookup {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            values: HashMap::new(),
            origin: origin.into(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapLookup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            origin: "memory".to_string(),
        }
    }
}

impl Lookup for MapLookup {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        Ok(self
            .values
            .get(name)
            .map(|v| Found::new(v.clone(), self.origin.clone())))
    }
}

/// Environment first, properties second
///
/// An environment variable set to the empty string counts as unset, so CI
/// systems that expand undefined secrets to `""` still reach the property
/// fallback. Lookup errors are logged and treated as absence.
pub fn load_value(key: SigningKey, env: &dyn Lookup, props: &dyn Lookup) -> Option<Found> {
    let name = key.name();

    match env.lookup(name) {
        Ok(Some(found)) if !found.value.is_empty() => return Some(found),
        Ok(_) => {}
        Err(e) => tracing::debug!(key = name, error = %e, "Ignoring unreadable environment value"),
    }

    match props.lookup(name) {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(key = name, error = %e, "Ignoring unreadable property value");
            None
        }
    }
}
