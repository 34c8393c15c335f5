// Duck Secrets - Logging
//
// Installs the global tracing subscriber. Logs go to stderr so query output
// on stdout stays clean. Secret values are never passed to tracing macros.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Build the filter: RUST_LOG wins, otherwise `default_level`.
pub fn env_filter(default_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_level)
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", default_level, e)),
    }
}

/// Initialize logging once for the process.
pub fn init(default_level: &str, format: LogFormat) -> Result<()> {
    let filter = env_filter(default_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
