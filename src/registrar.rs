//! Idempotent secret registration.
//!
//! [`register`] creates a DuckDB secret and treats "a secret with this name
//! already exists" as success. Calling it twice with the same credential set
//! yields `[Created, AlreadyExists]`.
//!
//! # Example
//!
//! ```no_run
//! use duck_secrets::credentials::{CredentialSet, SecretKind};
//! use duck_secrets::registrar::{register, RegistrationOutcome};
//! use duck_secrets::session::DuckDbSession;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut session = DuckDbSession::open_in_memory()?;
//! let creds = CredentialSet::new("s3_secret", SecretKind::S3, "AKIA...", "xxx", "us-east-1")?;
//!
//! assert_eq!(register(&mut session, &creds), RegistrationOutcome::Created);
//! assert_eq!(register(&mut session, &creds), RegistrationOutcome::AlreadyExists);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::credentials::{CredentialSet, SecretKind};
use crate::error::{CredentialError, DatabaseError, RegistrationError, Result};
use crate::session::DatabaseSession;

/// Result of one registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

impl RegistrationOutcome {
    /// `Created` and `AlreadyExists` both leave the secret usable.
    pub fn is_success(&self) -> bool {
        !matches!(self, RegistrationOutcome::Failed(_))
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationOutcome::Created => f.write_str("created"),
            RegistrationOutcome::AlreadyExists => f.write_str("already exists"),
            RegistrationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Register `secret` with the session, exactly once in effect.
pub fn register<S>(db: &mut S, secret: &CredentialSet) -> RegistrationOutcome
where
    S: DatabaseSession + ?Sized,
{
    match create_secret(db, secret) {
        Ok(()) => RegistrationOutcome::Created,
        Err(e) if e.is_duplicate_secret(secret.name()) => RegistrationOutcome::AlreadyExists,
        Err(e) => RegistrationOutcome::Failed(e.message().to_string()),
    }
}

/// Issue `CREATE SECRET` without any duplicate handling.
pub fn create_secret<S>(db: &mut S, secret: &CredentialSet) -> std::result::Result<(), DatabaseError>
where
    S: DatabaseSession + ?Sized,
{
    db.execute(&create_secret_statement(secret))
}

/// Register `secret`, logging the outcome, and turn `Failed` into an error.
pub fn ensure_registered<S>(db: &mut S, secret: &CredentialSet) -> Result<RegistrationOutcome>
where
    S: DatabaseSession + ?Sized,
{
    let outcome = register(db, secret);
    match &outcome {
        RegistrationOutcome::Created => {
            tracing::info!(secret = secret.name(), "Successfully created secret");
        }
        RegistrationOutcome::AlreadyExists => {
            tracing::info!(secret = secret.name(), "Secret already exists, skipping");
        }
        RegistrationOutcome::Failed(reason) => {
            tracing::error!(secret = secret.name(), %reason, "Unknown error when creating secret");
            return Err(RegistrationError {
                name: secret.name().to_string(),
                reason: reason.clone(),
            }
            .into());
        }
    }
    Ok(outcome)
}

/// Configure S3 access with session settings instead of a named secret.
///
/// This predates DuckDB's secrets manager. Settings are simply overwritten,
/// so there is no duplicate case.
pub fn apply_legacy_settings<S>(db: &mut S, secret: &CredentialSet) -> Result<()>
where
    S: DatabaseSession + ?Sized,
{
    if secret.kind() != SecretKind::S3 {
        return Err(CredentialError::LegacyUnsupported(secret.kind().to_string()).into());
    }

    db.execute(&legacy_settings_statement(secret))?;
    tracing::info!("Applied legacy S3 settings");
    Ok(())
}

/// Render the `CREATE SECRET` statement for `secret`.
pub fn create_secret_statement(secret: &CredentialSet) -> String {
    format!(
        "CREATE SECRET {} (\n    TYPE {},\n    KEY_ID {},\n    SECRET {},\n    REGION {}\n);",
        secret.name(),
        secret.kind().sql_type(),
        quote_literal(secret.key_id()),
        quote_literal(secret.secret()),
        quote_literal(secret.region()),
    )
}

fn legacy_settings_statement(secret: &CredentialSet) -> String {
    format!(
        "SET s3_access_key_id={}; SET s3_secret_access_key={}; SET s3_region={};",
        quote_literal(secret.key_id()),
        quote_literal(secret.secret()),
        quote_literal(secret.region()),
    )
}

/// Quote `value` as a SQL string literal.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
