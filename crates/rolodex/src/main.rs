//! Rolodex - Entry point
//!
//! Loads configuration, sets up logging and serves the contact manager.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info};

use rolodex::config::{ConfigLoader, RolodexConfig, ENV_PREFIX};
use rolodex::telemetry::init_logging;

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = args.next().map(PathBuf::from);
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("rolodex {}", rolodex::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
            }
        }

        Self { config }
    }
}

fn print_help() {
    println!(
        r"Rolodex - Server-rendered contact manager

USAGE:
    rolodex [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    ROLODEX_CONFIG                  Configuration file (default: rolodex.toml if present)
    ROLODEX_HOST                    Listen host (default: 0.0.0.0)
    ROLODEX_PORT                    Listen port (default: 8080)
    ROLODEX_STATIC_DIR              Static asset directory (default: static)
    ROLODEX_READ_TIMEOUT_SECS       Request read timeout (default: 5)
    ROLODEX_WRITE_TIMEOUT_SECS      Handler timeout (default: 10)
    ROLODEX_IDLE_TIMEOUT_SECS       Keep-alive idle timeout (default: 120)
    ROLODEX_SHUTDOWN_TIMEOUT_SECS   Shutdown grace period (default: 10)
    ROLODEX_SEED                    Load sample contacts (default: true)
    ROLODEX_LOG_LEVEL               Log filter (default: info)
    ROLODEX_LOG_FORMAT              pretty, json or compact (default: pretty)
    RUST_LOG                        Overrides ROLODEX_LOG_LEVEL

EXAMPLES:
    # Run with configuration file
    rolodex --config /etc/rolodex/rolodex.toml

    # Run on another port with JSON logs
    ROLODEX_PORT=3000 ROLODEX_LOG_FORMAT=json rolodex
"
    );
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<RolodexConfig> {
    let config = match path {
        Some(path) => ConfigLoader::new()
            .with_defaults()
            .with_dotenv()?
            .with_file(&path)
            .with_context(|| format!("failed to load {}", path.display()))?
            .with_env_prefix(ENV_PREFIX)
            .load()?,
        None => ConfigLoader::from_environment()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config).context("invalid configuration")?;
    init_logging(&config.logging.to_log_config()).context("failed to initialize logging")?;

    info!(version = rolodex::VERSION, "starting rolodex");

    if let Err(e) = rolodex::run(config).await {
        error!(error = format!("{e:#}"), "server error");
        return Err(e);
    }

    Ok(())
}
