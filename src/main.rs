use clap::Parser;
use colored::{self, Colorize};
use config::{JobConfig, Mode};
use error::JobError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod kube;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.into_config();
    let action = match config.mode {
        Mode::Submit => "create",
        Mode::Remove => "delete",
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "Unable to {} job due to error: {}",
                action,
                format!("{err:#}").red().bold()
            );

            err.downcast_ref::<JobError>()
                .map(JobError::exit_code)
                .unwrap_or(ExitCode::FAILURE)
        }
    }
}

async fn run(config: &JobConfig) -> anyhow::Result<()> {
    // Refuse a malformed job before touching the cluster configuration
    if config.mode == Mode::Submit {
        config.descriptor.validate()?;
    }

    let api = kube::KubeJobApi::new(config.kubeconfig.as_deref()).await?;
    let client = kube::JobSubmissionClient::new(api, config.timeout).dry_run(config.dry_run);

    cli::run(config, &client).await
}
