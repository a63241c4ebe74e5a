//! Layered Gradle project properties
//!
//! Mirrors the order in which Gradle's `findProperty` resolves a name:
//! command-line `-P` values, `ORG_GRADLE_PROJECT_*` environment variables,
//! the user-level `gradle.properties`, then the project's property files.

use crate::credentials::{Found, Lookup, LookupError};
use signkit_core::paths;
use signkit_core::properties::Properties;
use std::path::Path;

/// Prefix Gradle strips from environment variables to form project properties
pub const PROJECT_ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

/// Properties loaded from one file or the command line
#[derive(Debug, Clone)]
pub struct PropertiesLayer {
    props: Properties,
    origin: String,
}

impl PropertiesLayer {
    pub fn new(props: Properties, origin: impl Into<String>) -> Self {
        Self {
            props,
            origin: origin.into(),
        }
    }
}

impl Lookup for PropertiesLayer {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        Ok(self
            .props
            .get(name)
            .map(|v| Found::new(v, self.origin.clone())))
    }
}

/// `ORG_GRADLE_PROJECT_<name>` variables from an environment
#[derive(Debug, Clone)]
pub struct ProjectEnvLayer<L> {
    env: L,
}

impl<L: Lookup> ProjectEnvLayer<L> {
    pub fn new(env: L) -> Self {
        Self { env }
    }
}

impl<L: Lookup> Lookup for ProjectEnvLayer<L> {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        let var = format!("{PROJECT_ENV_PREFIX}{name}");
        Ok(self.env.lookup(&var)?.map(|f| Found::new(f.value, var)))
    }
}

/// Ordered stack of property sources; the first hit wins
#[derive(Default)]
pub struct PropertyStore {
    layers: Vec<Box<dyn Lookup>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with lower precedence than the existing ones
    #[must_use]
    pub fn with_layer(mut self, layer: impl Lookup + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn push_layer(&mut self, layer: impl Lookup + 'static) {
        self.layers.push(Box::new(layer));
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Assemble the layers Gradle would consult for a project
    ///
    /// `$GRADLE_USER_HOME/gradle.properties` comes right after the overrides
    /// and project environment, so per-machine values beat committed ones.
    /// `files` are relative to `android_dir` and are read in order after it.
    /// Missing files are skipped; unreadable ones are logged and skipped.
    pub fn for_gradle_project<L: Lookup + Clone + 'static>(
        android_dir: &Path,
        files: &[String],
        overrides: Properties,
        env: L,
    ) -> Self {
        let mut store = Self::new();

        if !overrides.is_empty() {
            store.push_layer(PropertiesLayer::new(overrides, "-P"));
        }
        store.push_layer(ProjectEnvLayer::new(env.clone()));

        let user_home_override = env
            .lookup("GRADLE_USER_HOME")
            .ok()
            .flatten()
            .map(|f| f.value);
        if let Some(home) = paths::gradle_user_home(user_home_override.as_deref()) {
            store.push_file(&home.join("gradle.properties"));
        }

        for file in files {
            store.push_file(&android_dir.join(file));
        }

        store
    }

    fn push_file(&mut self, path: &Path) {
        match Properties::load_optional(path) {
            Ok(Some(props)) => {
                tracing::debug!(path = %path.display(), entries = props.len(), "Loaded property file");
                self.push_layer(PropertiesLayer::new(props, path.display().to_string()));
            }
            Ok(None) => tracing::trace!(path = %path.display(), "Property file not present"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable property file"),
        }
    }
}

impl Lookup for PropertyStore {
    fn lookup(&self, name: &str) -> Result<Option<Found>, LookupError> {
        for layer in &self.layers {
            match layer.lookup(name) {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "Property layer lookup failed"),
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("layers", &self.layers.len())
            .finish()
    }
}
