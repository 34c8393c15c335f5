//! Common testing utilities for Duck Secrets integration tests.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use duck_secrets::error::DatabaseError;
use duck_secrets::session::DatabaseSession;

/// Test context that manages temporary files and directories.
pub struct TestContext {
    /// Path to temporary directory
    pub temp_path: PathBuf,
    /// The temporary directory (kept to prevent early deletion)
    _temp_dir: TempDir,
}

impl TestContext {
    /// Create a new test context with a temporary directory.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path().to_path_buf();

        Ok(Self {
            temp_path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a test file with content.
    pub fn create_file(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let file_path = self.temp_path.join(name);
        let mut file = fs::File::create(&file_path)?;
        file.write_all(content.as_bytes())?;
        Ok(file_path)
    }

    /// Create a config file pointing the secret at the given env var names.
    #[allow(dead_code)]
    pub fn create_config(&self, key_id_env: &str, secret_env: &str) -> anyhow::Result<PathBuf> {
        let content = format!(
            "secret:\n  name: s3_secret\n  kind: s3\n  region: us-east-1\n  key_id_env: {}\n  secret_env: {}\nsource:\n  bucket: test-bucket\n  prefix: data\n",
            key_id_env, secret_env
        );
        self.create_file("duck-secrets.yaml", &content)
    }

    /// Get the path to a file in the temp directory.
    #[allow(dead_code)]
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_path.join(name)
    }
}

/// Session double that mirrors DuckDB's temporary secret storage.
#[derive(Default)]
pub struct MockSession {
    secrets: HashSet<String>,
    /// Every statement received, in order
    pub statements: Vec<String>,
    /// When set, every statement fails with this message
    pub fail_with: Option<String>,
}

impl MockSession {
    #[allow(dead_code)]
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn has_secret(&self, name: &str) -> bool {
        self.secrets.contains(name)
    }
}

impl DatabaseSession for MockSession {
    fn execute(&mut self, statement: &str) -> Result<(), DatabaseError> {
        self.statements.push(statement.to_string());

        if let Some(message) = &self.fail_with {
            return Err(DatabaseError::statement(message.clone()));
        }

        if let Some(rest) = statement.strip_prefix("CREATE SECRET ") {
            let name = rest
                .split(|c: char| c.is_whitespace() || c == '(')
                .next()
                .unwrap_or_default()
                .to_string();
            if !self.secrets.insert(name.clone()) {
                return Err(DatabaseError::statement(format!(
                    "Invalid Input Error: Temporary secret with name '{}' already exists!",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_session_rejects_duplicate_names() {
        let mut session = MockSession::default();
        assert!(session.execute("CREATE SECRET a (TYPE S3);").is_ok());
        let err = session.execute("CREATE SECRET a (TYPE S3);").unwrap_err();

        assert!(err.is_duplicate_secret("a"));
        assert!(session.has_secret("a"));
        assert_eq!(session.statements.len(), 2);
    }

    #[test]
    fn test_test_context_create_file() {
        let ctx = TestContext::new().unwrap();
        let file_path = ctx.create_file("test.txt", "Hello, World!").unwrap();

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Hello, World!");
    }
}
