//! Object-storage credential sets.
//!
//! A [`CredentialSet`] is built once from configuration and the process
//! environment, handed to the registrar, and dropped. It is never mutated.
//!
//! The secret value is private and is never included in `Debug` output or
//! log lines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SecretConfig;
use crate::error::CredentialError;

/// Provider tag of a credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    #[default]
    S3,
    Gcs,
}

impl SecretKind {
    /// The `TYPE` keyword DuckDB expects in `CREATE SECRET`.
    pub fn sql_type(&self) -> &'static str {
        match self {
            SecretKind::S3 => "S3",
            SecretKind::Gcs => "GCS",
        }
    }

    /// URL scheme used to address objects for this provider.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            SecretKind::S3 => "s3",
            SecretKind::Gcs => "gs",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

impl FromStr for SecretKind {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(SecretKind::S3),
            "gcs" => Ok(SecretKind::Gcs),
            _ => Err(CredentialError::UnknownKind(s.to_string())),
        }
    }
}

/// A named bundle of access credentials for one storage provider.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    name: String,
    kind: SecretKind,
    key_id: String,
    /// NEVER printed, logged, or Debug-displayed
    secret: String,
    region: String,
}

impl CredentialSet {
    /// Create a validated credential set.
    ///
    /// The name must be a plain SQL identifier because it is embedded
    /// unquoted in `CREATE SECRET`. All other fields must be non-empty.
    pub fn new(
        name: impl Into<String>,
        kind: SecretKind,
        key_id: impl Into<String>,
        secret: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let name = name.into();
        let key_id = key_id.into();
        let secret = secret.into();
        let region = region.into();

        validate_name(&name)?;
        if key_id.is_empty() {
            return Err(CredentialError::EmptyField("key_id"));
        }
        if secret.is_empty() {
            return Err(CredentialError::EmptyField("secret"));
        }
        if region.is_empty() {
            return Err(CredentialError::EmptyField("region"));
        }

        Ok(Self {
            name,
            kind,
            key_id,
            secret,
            region,
        })
    }

    /// Build a credential set from config, reading the key id and secret
    /// from the environment variables it names.
    pub fn from_env(config: &SecretConfig) -> Result<Self, CredentialError> {
        Self::from_lookup(config, |var| std::env::var(var).ok())
    }

    /// Same as [`CredentialSet::from_env`] with an injectable lookup.
    ///
    /// Unset and empty variables are both treated as missing.
    pub fn from_lookup<F>(config: &SecretConfig, lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key_id = required_var(&config.key_id_env, &lookup)?;
        tracing::debug!(var = %config.key_id_env, "Access key id loaded");

        let secret = required_var(&config.secret_env, &lookup)?;
        tracing::debug!(var = %config.secret_env, "Secret access key loaded");

        Self::new(
            config.name.clone(),
            config.kind,
            key_id,
            secret,
            config.region.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SecretKind {
        self.kind
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Access the raw secret value.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("key_id", &self.key_id)
            .field("secret", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

fn required_var<F>(var: &str, lookup: &F) -> Result<String, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CredentialError::MissingEnv(var.to_string())),
    }
}

/// Check that `name` is a bare SQL identifier.
pub fn validate_name(name: &str) -> Result<(), CredentialError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CredentialError::InvalidName(name.to_string()))
    }
}
