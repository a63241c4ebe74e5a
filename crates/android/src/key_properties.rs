//! `key.properties` generation
//!
//! Flutter's Android template reads signing values from
//! `android/key.properties`. This writes one from a usable resolution.

use crate::resolver::Resolution;
use signkit_core::error::{Error, Result, ResultExt};
use signkit_core::properties;
use std::io::Write;
use std::path::Path;

/// File name Flutter's template expects in the Android directory
pub const KEY_PROPERTIES_FILE: &str = "key.properties";

/// Render `key.properties` for a usable resolution
pub fn render(resolution: &Resolution) -> Result<String> {
    let identity = &resolution.identity;
    let (true, Some(alias), Some(key_pw), Some(store), Some(store_pw)) = (
        resolution.usable,
        identity.key_alias.as_deref(),
        identity.key_password.as_ref(),
        identity.store_file(),
        identity.store_password.as_ref(),
    ) else {
        let missing: Vec<&str> = resolution.missing.iter().map(|k| k.name()).collect();
        return Err(Error::incomplete_identity(&missing)
            .with_context("Refusing to write key.properties for an unusable identity"));
    };

    let store = store.display().to_string();
    Ok(properties::render([
        ("storePassword", store_pw.expose()),
        ("keyPassword", key_pw.expose()),
        ("keyAlias", alias),
        ("storeFile", store.as_str()),
    ]))
}

/// Write `key.properties` to `path`, owner-readable only on Unix
pub fn write(resolution: &Resolution, path: &Path) -> Result<()> {
    let content = render(resolution)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(Error::directory_not_found(parent));
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .map_err(Error::from)
        .context(format!("Writing {}", path.display()))?;

    // an existing file keeps its old mode; tighten it before the secrets go in
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(content.as_bytes())
        .map_err(Error::from)
        .context(format!("Writing {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote key.properties");
    Ok(())
}
