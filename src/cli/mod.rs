use crate::config::{JobConfig, Mode, Output};
use crate::kube::descriptor::{DEFAULT_IMAGE, DEFAULT_JOB_NAME, DEFAULT_NAMESPACE};
use crate::kube::spec::SpecHandler;
use crate::kube::{DEFAULT_TIMEOUT, JobApi, JobDescriptor, JobSubmissionClient};
use anyhow::{Context, Result};
use clap::Parser;
use colored::{self, Colorize};
use k8s_openapi::api::batch::v1::Job;
use spinners::{Spinner, Spinners};
use std::future::Future;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "A command to create or delete a single kubernetes batch job"
)]
pub struct Cli {
    /// Path to the kubeconfig file, inferred from KUBECONFIG, ~/.kube/config or the in-cluster config when omitted
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Container image run by the job
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// Remove the job from the cluster instead of creating it
    #[arg(long)]
    purge: bool,

    #[arg(short, long, default_value = DEFAULT_JOB_NAME)]
    name: String,

    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Label set on the job and its pods, as KEY=VALUE
    #[arg(short = 'l', long = "label", value_parser = parse_key_value)]
    labels: Vec<(String, String)>,

    /// Annotation set on the job and its pods, as KEY=VALUE
    #[arg(short = 'a', long = "annotation", value_parser = parse_key_value)]
    annotations: Vec<(String, String)>,

    /// Entrypoint override, repeat for each element
    #[arg(long = "command", allow_hyphen_values = true)]
    command: Vec<String>,

    /// Argument override, repeat for each element
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,

    #[arg(long)]
    backoff_limit: Option<i32>,

    #[arg(long)]
    ttl_seconds_after_finished: Option<i32>,

    /// Deadline in seconds for the call to the cluster
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Let the server validate the request without persisting it
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long, value_enum, default_value_t = Output::Yaml)]
    output: Output,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected KEY=VALUE but got {raw:?}"));
    };

    if key.trim().is_empty() {
        return Err(format!("missing key in {raw:?}"));
    }

    Ok((key.trim().to_string(), value.to_string()))
}

impl Cli {
    pub fn into_config(self) -> JobConfig {
        let descriptor = JobDescriptor {
            name: self.name,
            namespace: self.namespace,
            labels: self.labels.into_iter().collect(),
            annotations: self.annotations.into_iter().collect(),
            command: self.command,
            args: self.args,
            backoff_limit: self.backoff_limit,
            ttl_seconds_after_finished: self.ttl_seconds_after_finished,
            ..JobDescriptor::new(self.image)
        };

        JobConfig {
            mode: if self.purge { Mode::Remove } else { Mode::Submit },
            descriptor,
            kubeconfig: self.kubeconfig,
            timeout: Duration::from_secs(self.timeout),
            dry_run: self.dry_run,
            output: self.output,
        }
    }
}

/// Run the selected operation against the cluster
///
/// # Arguments
///
/// * `config` - &JobConfig
/// * `client` - &JobSubmissionClient<A>
pub async fn run<A: JobApi>(config: &JobConfig, client: &JobSubmissionClient<A>) -> Result<()> {
    let descriptor = &config.descriptor;
    let namespace = descriptor.namespace();

    match config.mode {
        Mode::Submit => {
            println!(
                "Creating job {} in namespace {}",
                descriptor.name.truecolor(7, 174, 237).bold(),
                namespace.truecolor(133, 59, 255).bold()
            );

            let job = with_spinner("Waiting for the cluster", client.submit(descriptor)).await?;
            report(&job, config.output, client.is_dry_run())?;
        }
        Mode::Remove => {
            println!(
                "Deleting job {} from namespace {}",
                descriptor.name.truecolor(7, 174, 237).bold(),
                namespace.truecolor(133, 59, 255).bold()
            );

            with_spinner(
                "Waiting for the cluster",
                client.remove(&descriptor.name, namespace),
            )
            .await?;

            match client.is_dry_run() {
                true => println!("Job {} would be deleted", descriptor.name.bright_purple().bold()),
                false => println!(
                    "Job {} deleted",
                    descriptor.name.truecolor(7, 174, 237).bold()
                ),
            }
        }
    }

    Ok(())
}

async fn with_spinner<T, F: Future<Output = T>>(message: &str, call: F) -> T {
    if !std::io::stdout().is_terminal() {
        return call.await;
    }

    let mut spinner = Spinner::new(Spinners::Dots, message.to_string());
    let res = call.await;
    spinner.stop_with_newline();

    res
}

/// Print the job returned by the cluster
///
/// # Arguments
///
/// * `job` - &Job
/// * `output` - Output
/// * `dry_run` - bool
fn report(job: &Job, output: Output, dry_run: bool) -> Result<()> {
    let name = job.metadata.name.clone().unwrap_or_default();

    match dry_run {
        true => println!("\nDry run result for job {}", name.bright_purple().bold()),
        false => println!("Job {} created", name.truecolor(7, 174, 237).bold()),
    }

    match output {
        Output::Yaml => {
            let yaml = serde_yml::to_string(job).context("Unable to render the job as yaml")?;
            println!("\n{}", yaml);
        }
        Output::Json => {
            let json =
                serde_json::to_string_pretty(job).context("Unable to render the job as json")?;
            println!("\n{}", json);
        }
        Output::Summary => {
            for (field, value) in summary(job) {
                println!("  {:<10} {}", format!("{field}:").bold(), value);
            }
        }
    }

    Ok(())
}

fn summary(job: &Job) -> Vec<(&'static str, String)> {
    let metadata = &job.metadata;
    let image = job
        .spec
        .as_ref()
        .and_then(|spec| spec.get_container().ok())
        .and_then(|container| container.image.clone());

    vec![
        ("name", metadata.name.clone().unwrap_or_default()),
        ("namespace", metadata.namespace.clone().unwrap_or_default()),
        ("image", image.unwrap_or_default()),
        (
            "restart",
            job.spec
                .as_ref()
                .and_then(|spec| spec.get_restart_policy())
                .unwrap_or("-")
                .to_string(),
        ),
        ("uid", metadata.uid.clone().unwrap_or_else(|| "-".to_string())),
        (
            "created",
            metadata
                .creation_timestamp
                .as_ref()
                .map(|ts| format_timestamp(&ts.0))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

fn format_timestamp(ts: &jiff::Timestamp) -> String {
    ts.strftime("%Y-%m-%d %H:%M:%S UTC").to_string()
}
