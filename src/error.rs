// Duck Secrets - Error types
//
// Library-level errors. The binary wraps these in anyhow at the boundary.

use thiserror::Error;

/// What went wrong inside the embedded database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    /// A secret with this name is already registered in the session.
    SecretAlreadyExists { name: String },
    /// The database could not be opened.
    Connection,
    /// Any other statement-level failure.
    Statement,
}

/// Structured error returned by a [`crate::session::DatabaseSession`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DatabaseError {
    kind: DatabaseErrorKind,
    message: String,
}

const INVALID_INPUT_PREFIX: &str = "Invalid Input Error: ";
const NAME_PREFIX: &str = "secret with name '";
const EXISTS_SUFFIX: &str = "' already exists!";

impl DatabaseError {
    /// Build a statement-level error, recognising DuckDB's duplicate-secret message.
    pub fn statement(message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = match duplicate_secret_name(&message) {
            Some(name) => DatabaseErrorKind::SecretAlreadyExists {
                name: name.to_string(),
            },
            None => DatabaseErrorKind::Statement,
        };
        Self { kind, message }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: DatabaseErrorKind::Connection,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &DatabaseErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if this error reports that `name` is already registered.
    pub fn is_duplicate_secret(&self, name: &str) -> bool {
        matches!(&self.kind, DatabaseErrorKind::SecretAlreadyExists { name: n } if n == name)
    }
}

/// Extract the secret name from an exact duplicate-secret message.
///
/// DuckDB reports e.g. `Invalid Input Error: Temporary secret with name 's3_secret' already exists!`.
fn duplicate_secret_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix(INVALID_INPUT_PREFIX)?;
    let rest = rest
        .strip_prefix("Temporary ")
        .or_else(|| rest.strip_prefix("Persistent "))?;
    let name = rest.strip_prefix(NAME_PREFIX)?.strip_suffix(EXISTS_SUFFIX)?;
    if name.is_empty() || name.contains('\'') {
        return None;
    }
    Some(name)
}

/// Errors raised while building a credential set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("required environment variable {0} is not set")]
    MissingEnv(String),

    #[error("credential field '{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("invalid secret name '{0}': expected letters, digits and underscores, not starting with a digit")]
    InvalidName(String),

    #[error("unknown secret kind '{0}': expected 's3' or 'gcs'")]
    UnknownKind(String),

    #[error("legacy settings only support S3 credentials, got {0}")]
    LegacyUnsupported(String),
}

/// Raised by the caller policy when registration did not succeed.
#[derive(Debug, Error)]
#[error("failed to register secret '{name}': {reason}")]
pub struct RegistrationError {
    pub name: String,
    pub reason: String,
}

/// Top-level error type for all Duck Secrets operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

pub type Result<T> = std::result::Result<T, Error>;
