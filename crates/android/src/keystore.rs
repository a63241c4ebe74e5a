//! Keystore inspection and `keytool` validation

use crate::identity::SigningIdentity;
use serde::Serialize;
use sha2::{Digest, Sha256};
use signkit_core::error::{Error, ErrorCode, Result};
use signkit_core::process::{command_exists, run_command_with_env};
use std::io::Read;
use std::path::Path;

/// Variable carrying the store password to `keytool -storepass:env`
pub const STOREPASS_ENV: &str = "SIGNKIT_STOREPASS";

/// Keystore container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeystoreType {
    Jks,
    Pkcs12,
}

impl KeystoreType {
    /// Detect the format from magic bytes
    ///
    /// JKS files start with `FEEDFEED`; anything else is assumed to be
    /// PKCS#12, the default since Java 9.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&[0xFE, 0xED, 0xFE, 0xED]) {
            Self::Jks
        } else {
            Self::Pkcs12
        }
    }

    /// Name passed to `keytool -storetype`
    pub fn keytool_name(self) -> &'static str {
        match self {
            Self::Jks => "JKS",
            Self::Pkcs12 => "PKCS12",
        }
    }
}

/// Facts about a keystore file that need no password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeystoreInfo {
    pub keystore_type: KeystoreType,
    pub size: u64,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Read a keystore and compute its type and fingerprint
pub fn inspect(path: &Path) -> Result<KeystoreInfo> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        Error::from(e).with_context(format!("Opening keystore {}", path.display()))
    })?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    Ok(KeystoreInfo {
        keystore_type: KeystoreType::detect(&data),
        size: data.len() as u64,
        sha256: hex::encode(Sha256::digest(&data)),
    })
}

/// Confirm with `keytool` that the store opens and contains the alias
pub fn verify(identity: &SigningIdentity) -> Result<KeystoreInfo> {
    let (Some(alias), Some(store), Some(store_pw)) = (
        identity.key_alias.as_deref(),
        identity.store_file(),
        identity.store_password.as_ref(),
    ) else {
        let missing: Vec<&str> = identity.missing_keys().iter().map(|k| k.name()).collect();
        return Err(Error::incomplete_identity(&missing));
    };

    let info = inspect(store)?;

    if !command_exists("keytool") {
        return Err(Error::command_not_found("keytool")
            .with_suggestion("Install a JDK and make sure keytool is on PATH"));
    }

    let result = run_command_with_env(
        "keytool",
        &keytool_list_args(store, info.keystore_type, alias),
        &[(STOREPASS_ENV.to_string(), store_pw.expose().to_string())],
    )?;

    if result.success {
        tracing::info!(alias, keystore = %store.display(), "Keystore verified");
        return Ok(info);
    }

    Err(classify_keytool_failure(&result.combined_output(), alias))
}

/// `keytool -list` arguments; the store password is read from [`STOREPASS_ENV`]
fn keytool_list_args(store: &Path, keystore_type: KeystoreType, alias: &str) -> Vec<String> {
    vec![
        "-list".to_string(),
        "-keystore".to_string(),
        store.display().to_string(),
        "-storetype".to_string(),
        keystore_type.keytool_name().to_string(),
        "-storepass:env".to_string(),
        STOREPASS_ENV.to_string(),
        "-alias".to_string(),
        alias.to_string(),
    ]
}

/// Map keytool's error text to a signing error
fn classify_keytool_failure(output: &str, alias: &str) -> Error {
    if output.contains("password was incorrect") {
        Error::new(ErrorCode::InvalidKeystorePassword, "Invalid keystore password")
            .with_suggestion("Check SIGNING_STORE_PASSWORD")
    } else if output.contains("does not exist") {
        Error::new(
            ErrorCode::AliasNotFound,
            format!("Alias '{alias}' not found in keystore"),
        )
        .with_suggestion("Check SIGNING_KEY_ALIAS; list aliases with keytool -list")
    } else if output.contains("Invalid keystore format") || output.contains("not a keystore") {
        Error::new(ErrorCode::InvalidKeystoreFormat, "Invalid keystore format")
    } else {
        Error::signing(format!("keytool failed: {}", output.trim()))
    }
}
