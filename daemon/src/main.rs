//! ProofPass daemon entry point.

mod app;
mod config;
mod shutdown;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use proofpass_types::Address;
use proofpass_utils::{init_logging, LogFormat};

use config::{DaemonConfig, Overrides};

#[derive(Parser)]
#[command(
    name = "proofpass-daemon",
    version,
    about = "ProofPass certificate verification registry"
)]
struct Cli {
    /// Path to a TOML config file. Flags and environment override it.
    #[arg(long, env = "PROOFPASS_CONFIG")]
    config: Option<PathBuf>,

    /// Registry owner address.
    #[arg(long, env = "PROOFPASS_OWNER")]
    owner: Option<Address>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "PROOFPASS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Bind address for the RPC server.
    #[arg(long, env = "PROOFPASS_RPC_BIND")]
    rpc_bind: Option<SocketAddr>,

    /// RPC port, replacing the port of the bind address.
    #[arg(long, env = "PROOFPASS_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Allowed CORS origins, comma separated.
    #[arg(long, env = "PROOFPASS_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Serve Prometheus metrics on /metrics.
    #[arg(long, env = "PROOFPASS_ENABLE_METRICS")]
    enable_metrics: bool,

    /// Log format: human or json.
    #[arg(long, env = "PROOFPASS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, env = "PROOFPASS_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the registry and its RPC server.
    Run,
    /// Print the default configuration as TOML.
    DefaultConfig,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            owner: self.owner,
            data_dir: self.data_dir.clone(),
            rpc_bind: self.rpc_bind,
            rpc_port: self.rpc_port,
            cors_origins: self.cors_origins.clone(),
            enable_metrics: self.enable_metrics,
            log_format: self.log_format,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", DaemonConfig::default().to_toml_string()?);
            Ok(())
        }
        Command::Run => {
            let mut config = match &cli.config {
                Some(path) => DaemonConfig::from_toml_file(path)?,
                None => DaemonConfig::default(),
            };
            config.apply(cli.overrides());

            init_logging(config.log_format, &config.log_level)?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                data_dir = %config.data_dir.display(),
                rpc_bind = %config.rpc_bind,
                "starting proofpass daemon"
            );

            app::run(config).await
        }
    }
}
