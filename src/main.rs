//! deploy-endpoint - one-shot SageMaker deployment check
//!
//! With no arguments: upload, deploy, predict once, tear down.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use prophet_deploy::deploy::teardown_endpoint;
use prophet_deploy::utils::logging::{LogFormat, init_logging};
use prophet_deploy::{DeployConfig, Deployer, Session};
use std::path::PathBuf;
use std::process::ExitCode;

/// Deploy the Prophet CPI model to a SageMaker endpoint, test it once, then delete it.
///
/// The endpoint incurs cost while it exists.
#[derive(Debug, Parser)]
#[command(name = "deploy-endpoint", version, about)]
struct Cli {
    /// Optional YAML file overriding the built-in settings
    #[arg(long, env = "DEPLOY_CONFIG")]
    config: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "DEPLOY_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Delete an endpoint left behind by an interrupted or failed run
    Teardown {
        /// Name of the endpoint to delete along with its configuration and model
        #[arg(long)]
        endpoint_name: String,
    },
}

async fn run(cli: Cli) -> prophet_deploy::Result<()> {
    let config = DeployConfig::load(cli.config.as_deref()).await?;

    match cli.command {
        None => {
            let session = Session::aws(&config).await?;
            Deployer::new(config, session).run().await?;
        }
        Some(Command::Teardown { endpoint_name }) => {
            let control = Session::control_client(&config).await?;
            let report = teardown_endpoint(&control, &endpoint_name).await?;
            for resource in &report.deleted {
                println!("Deleted {}", resource);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_format, "info");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
