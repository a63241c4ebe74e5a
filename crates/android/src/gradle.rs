//! Gradle build system integration
//!
//! Hands the selected signing identity and packaging toggles to Gradle.
//! `gradle-args` prints the Android Gradle plugin's
//! `android.injected.signing.*` properties, which override whatever
//! `signingConfig` the build script picked; [`build`] keeps release
//! passwords in the environment instead.

use crate::credentials::SigningKey;
use crate::identity::SigningIdentity;
use crate::secret::Secret;
use crate::variant::{BuildKind, SigningChoice, VariantConfig};
use signkit_core::error::{Error, Result};
use signkit_core::process::{run_command_streaming_in_dir, run_command_streaming_with_env};
use signkit_core::properties::Properties;
use std::path::{Path, PathBuf};

pub const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
pub const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
pub const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
pub const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Custom properties carrying the packaging toggles to the build script
pub const PROP_MINIFY: &str = "signkit.minify";
pub const PROP_SHRINK_RESOURCES: &str = "signkit.shrinkResources";

/// Platform-specific Gradle wrapper name
pub fn wrapper_name() -> &'static str {
    if cfg!(windows) { "gradlew.bat" } else { "gradlew" }
}

/// Locate the Gradle wrapper in `project_dir`
pub fn wrapper_path(project_dir: &Path) -> Result<PathBuf> {
    let path = project_dir.join(wrapper_name());
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::file_not_found(&path)
            .with_context("Looking for the Gradle wrapper")
            .with_suggestion("Run from the Flutter project root or pass --project-dir"))
    }
}

/// Task name for a build type, e.g. `assembleRelease` or `bundleDebug`
pub fn task_name(kind: BuildKind, bundle: bool) -> String {
    let verb = if bundle { "bundle" } else { "assemble" };
    format!("{verb}{}", kind.task_suffix())
}

/// Injected signing properties for a release variant, in a fixed order
///
/// Debug builds return nothing: the plugin already signs them with the
/// debug keystore.
pub fn injected_signing(variant: &VariantConfig) -> Vec<(&'static str, String)> {
    if variant.kind == BuildKind::Debug {
        return Vec::new();
    }

    let signing = &variant.signing;
    let (Some(store), Some(store_pw), Some(alias), Some(key_pw)) = (
        signing.store_file(),
        signing.store_password(),
        signing.key_alias(),
        signing.key_password(),
    ) else {
        return Vec::new();
    };

    vec![
        (INJECTED_STORE_FILE, store.display().to_string()),
        (INJECTED_STORE_PASSWORD, store_pw.expose().to_string()),
        (INJECTED_KEY_ALIAS, alias.to_string()),
        (INJECTED_KEY_PASSWORD, key_pw.expose().to_string()),
    ]
}

/// Packaging toggles as custom project properties
pub fn packaging_properties(variant: &VariantConfig) -> Vec<(&'static str, String)> {
    vec![
        (PROP_MINIFY, variant.minify.to_string()),
        (PROP_SHRINK_RESOURCES, variant.shrink_resources.to_string()),
    ]
}

/// `-Pname=value` arguments for signing and packaging
///
/// These include the passwords in clear text. [`build`] uses
/// [`invocation`] instead so they stay off the command line.
pub fn gradle_args(variant: &VariantConfig) -> Vec<String> {
    injected_signing(variant)
        .into_iter()
        .chain(packaging_properties(variant))
        .map(|(name, value)| property_arg(name, &value))
        .collect()
}

fn property_arg(name: &str, value: &str) -> String {
    format!("-P{name}={value}")
}

/// Arguments and environment for one Gradle run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradleInvocation {
    pub args: Vec<String>,
    /// Added to Gradle's environment; every name is a shell identifier
    pub env: Vec<(String, String)>,
}

/// How [`build`] hands a variant to Gradle
///
/// `gradlew` runs under `/bin/sh`, and dash drops variables whose names are
/// not identifiers, so `ORG_GRADLE_PROJECT_android.injected.*` never reaches
/// Gradle. Packaging toggles go out as `-P` arguments. A release identity
/// goes out as the `SIGNING_*` variables the app build script reads first.
/// The debug fallback only carries the well-known debug credentials and is
/// injected with `-P`.
pub fn invocation(variant: &VariantConfig) -> GradleInvocation {
    let mut invocation = GradleInvocation::default();

    match (variant.kind, &variant.signing) {
        (BuildKind::Release, SigningChoice::Release(identity)) => {
            invocation.env = signing_env(identity);
        }
        (BuildKind::Release, SigningChoice::Debug(_)) => {
            invocation.args.extend(
                injected_signing(variant)
                    .into_iter()
                    .map(|(name, value)| property_arg(name, &value)),
            );
        }
        (BuildKind::Debug, _) => {}
    }

    invocation.args.extend(
        packaging_properties(variant)
            .into_iter()
            .map(|(name, value)| property_arg(name, &value)),
    );
    invocation
}

/// The identity as `SIGNING_*` variables, store path made absolute
fn signing_env(identity: &SigningIdentity) -> Vec<(String, String)> {
    SigningKey::ALL
        .into_iter()
        .filter_map(|key| {
            let value = match key {
                SigningKey::KeyAlias => identity.key_alias.clone(),
                SigningKey::KeyPassword => identity.key_password.as_ref().map(exposed),
                SigningKey::StorePath => identity.store_file().map(|p| p.display().to_string()),
                SigningKey::StorePassword => identity.store_password.as_ref().map(exposed),
            }?;
            Some((key.name().to_string(), value))
        })
        .collect()
}

fn exposed(secret: &Secret) -> String {
    secret.expose().to_string()
}

/// Gradle invocation for one variant
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub project_dir: &'a Path,
    pub variant: &'a VariantConfig,
    pub bundle: bool,
    /// Extra `-P` values passed through verbatim
    pub extra_properties: &'a Properties,
}

/// Run `assemble`/`bundle` for the variant, streaming Gradle's output
///
/// Returns Gradle's exit code.
pub fn build(request: &BuildRequest<'_>) -> Result<i32> {
    let wrapper = wrapper_path(request.project_dir)?;
    let task = task_name(request.variant.kind, request.bundle);
    let invocation = invocation(request.variant);

    let mut args = vec![task.clone()];
    args.extend(invocation.args);
    args.extend(
        request
            .extra_properties
            .iter()
            .map(|(name, value)| property_arg(name, value)),
    );

    tracing::info!(
        task = %task,
        release_signing = request.variant.signing.is_release(),
        minify = request.variant.minify,
        "Running Gradle"
    );

    run_command_streaming_with_env(
        &wrapper.to_string_lossy(),
        &args,
        request.project_dir,
        &invocation.env,
    )
}

/// Run `clean`
pub fn clean(project_dir: &Path) -> Result<i32> {
    let wrapper = wrapper_path(project_dir)?;
    run_command_streaming_in_dir(&wrapper.to_string_lossy(), &["clean"], project_dir)
}
