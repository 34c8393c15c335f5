// Duck Secrets - Idempotent DuckDB secret registration
//
// This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use duck_secrets::config::Config;
use duck_secrets::credentials::CredentialSet;
use duck_secrets::query::{self, ObjectLocation};
use duck_secrets::registrar::{self, RegistrationOutcome};
use duck_secrets::session::DuckDbSession;
use std::path::{Path, PathBuf};

/// Duck Secrets - register DuckDB secrets idempotently and query object storage
#[derive(Parser, Debug)]
#[command(name = "duck-secrets")]
#[command(version)]
#[command(about = "Register DuckDB secrets idempotently and query object storage", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// DuckDB database file (overrides the config; default: in-memory)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log level filter (overrides the config; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk through registration twice, then query object storage
    Demo {
        /// Issue a third, non-idempotent CREATE SECRET that fails fatally
        #[arg(long, default_value = "false")]
        demo_error: bool,
    },

    /// Register the secret once and print the outcome
    Register,

    /// Register the secret and print a preview of the configured objects
    Query {
        /// Number of rows to fetch (default: from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Configure credentials and describe the columns of the configured objects
    Describe {
        /// Use SET s3_* settings instead of a named secret
        #[arg(long, default_value = "false")]
        legacy: bool,

        /// Print columns as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Check environment, configuration and the embedded database
    Doctor,
}

fn load_config(path: Option<&Path>, database: Option<&str>) -> Result<Config> {
    let mut config = Config::load(path)?;
    if let Some(database) = database {
        config.database.path = database.to_string();
    }
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

/// Read credentials before any session is opened.
fn load_credentials(config: &Config) -> Result<CredentialSet> {
    tracing::info!(
        key_id_env = %config.secret.key_id_env,
        secret_env = %config.secret.secret_env,
        "Loading credentials from environment"
    );
    let creds = CredentialSet::from_env(&config.secret)?;
    tracing::info!(secret = creds.name(), kind = %creds.kind(), "Credentials loaded");
    Ok(creds)
}

fn open_session(config: &Config) -> Result<DuckDbSession> {
    let path = config.database_path()?;
    let session = DuckDbSession::open_optional(path.as_deref())?;
    Ok(session)
}

fn location(config: &Config) -> ObjectLocation {
    ObjectLocation::new(
        config.secret.kind,
        &config.source.bucket,
        &config.source.prefix,
    )
}

fn run_demo(config: &Config, demo_error: bool) -> Result<()> {
    tracing::info!("Welcome to the DuckDB secrets demo");

    let creds = load_credentials(config)?;
    let mut session = open_session(config)?;

    for attempt in 1..=2 {
        tracing::info!(attempt, secret = creds.name(), "Trying to set DuckDB secret");
        registrar::ensure_registered(&mut session, &creds)?;
    }

    if demo_error {
        tracing::error!("This will generate a runtime error, goodbye");
        registrar::create_secret(&mut session, &creds)
            .with_context(|| format!("Failed to create secret '{}'", creds.name()))?;
    } else {
        tracing::info!("Skipping error demo");
    }

    tracing::info!("Run a test query");
    let location = location(config);
    let table = query::preview(&session, &location.relation(), config.source.limit)
        .with_context(|| format!("Query against {} failed", location))?;

    println!("{}", table);
    Ok(())
}

fn run_register(config: &Config) -> Result<()> {
    let creds = load_credentials(config)?;
    let mut session = open_session(config)?;

    let outcome = registrar::register(&mut session, &creds);
    println!("Secret '{}': {}", creds.name(), outcome);

    if let RegistrationOutcome::Failed(reason) = outcome {
        anyhow::bail!("Failed to register secret '{}': {}", creds.name(), reason);
    }
    Ok(())
}

fn run_query(config: &Config, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.source.limit);
    if limit == 0 {
        anyhow::bail!("Limit must be greater than zero");
    }

    let creds = load_credentials(config)?;
    let mut session = open_session(config)?;
    registrar::ensure_registered(&mut session, &creds)?;

    let location = location(config);
    tracing::info!(%location, limit, "Querying object storage");
    let table = query::preview(&session, &location.relation(), limit)
        .with_context(|| format!("Query against {} failed", location))?;

    println!("{}", table);
    Ok(())
}

fn run_describe(config: &Config, legacy: bool, json: bool) -> Result<()> {
    let creds = load_credentials(config)?;
    let mut session = open_session(config)?;

    if legacy {
        registrar::apply_legacy_settings(&mut session, &creds)?;
    } else {
        registrar::ensure_registered(&mut session, &creds)?;
    }

    let location = location(config);
    tracing::info!(%location, "Describing object storage");
    let columns = query::describe(&session, &location.relation())
        .with_context(|| format!("Describe of {} failed", location))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
    } else {
        for column in &columns {
            println!("{}", column);
        }
    }
    Ok(())
}

fn check_env_var(var: &str) -> bool {
    std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false)
}

fn run_doctor(config_path: Option<&Path>, database: Option<&str>) -> Result<()> {
    println!("🔍 Duck Secrets Doctor");
    println!("Checking prerequisites...\n");

    let mut all_checks_passed = true;

    // Check 1: configuration
    print!("1. Checking configuration... ");
    let config = match load_config(config_path, database) {
        Ok(config) => {
            println!("✓");
            match config_path {
                Some(path) => println!("   📄 Loaded {}", path.display()),
                None => println!("   📄 Using built-in defaults"),
            }
            Some(config)
        }
        Err(e) => {
            println!("✗");
            println!("   ❌ {:#}", e);
            all_checks_passed = false;
            None
        }
    };
    let config = config.unwrap_or_default();

    // Check 2 and 3: credential environment variables
    let env_checks = [
        ("2", &config.secret.key_id_env),
        ("3", &config.secret.secret_env),
    ];
    for (step, var) in env_checks {
        print!("{}. Checking ${} environment variable... ", step, var);
        if check_env_var(var) {
            println!("✓");
        } else {
            println!("✗");
            println!("   ❌ ${} is not set", var);
            println!("   💡 Set it with: export {}=...", var);
            all_checks_passed = false;
        }
    }

    // Check 4: embedded database
    print!("4. Checking embedded DuckDB... ");
    match open_session(&config).and_then(|s| Ok(s.version()?)) {
        Ok(version) => {
            println!("✓");
            println!("   🦆 DuckDB {}", version);
        }
        Err(e) => {
            println!("✗");
            println!("   ❌ {:#}", e);
            all_checks_passed = false;
        }
    }

    println!();
    if all_checks_passed {
        println!("✅ All checks passed! Your system is ready.");
        Ok(())
    } else {
        println!("❌ Some checks failed. Please fix the issues above.");
        Err(anyhow::anyhow!("Doctor checks failed"))
    }
}

fn init_logging(cli: &Cli, config: Option<&Config>) {
    let defaults = Config::default();
    let logging = &config.unwrap_or(&defaults).logging;
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);

    if let Err(e) = duck_secrets::logging::init(level, logging.format) {
        eprintln!("⚠️  {}", e);
    }
}

fn fail(e: anyhow::Error, hint: &str) -> ! {
    eprintln!("\nError: {:#}", e);
    eprintln!("\n💡 {}", hint);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    // Doctor reports configuration problems itself instead of aborting on them.
    let config = if matches!(cli.command, Commands::Doctor) {
        None
    } else {
        match load_config(cli.config.as_deref(), cli.database.as_deref()) {
            Ok(config) => Some(config),
            Err(e) => {
                init_logging(&cli, None);
                fail(e, "Run 'duck-secrets doctor' to check your configuration.");
            }
        }
    };
    init_logging(&cli, config.as_ref());
    let config = config.unwrap_or_default();

    // Every run_* owns its session, so the database is closed before exit.
    let result = match &cli.command {
        Commands::Demo { demo_error } => run_demo(&config, *demo_error),
        Commands::Register => run_register(&config),
        Commands::Query { limit } => run_query(&config, *limit),
        Commands::Describe { legacy, json } => run_describe(&config, *legacy, *json),
        Commands::Doctor => run_doctor(cli.config.as_deref(), cli.database.as_deref()),
    };

    if let Err(e) = result {
        fail(
            e,
            &format!(
                "Make sure ${} and ${} are set. Run 'duck-secrets doctor' to check your setup.",
                config.secret.key_id_env, config.secret.secret_env
            ),
        );
    }
}
