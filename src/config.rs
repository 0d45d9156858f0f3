use crate::kube::JobDescriptor;
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// What the invocation does with the job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Submit,
    Remove,
}

/// How the job returned by the cluster is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// Name, namespace, uid and creation time
    Summary,
    #[default]
    Yaml,
    Json,
}

/// Settings of a single invocation
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub mode: Mode,
    pub descriptor: JobDescriptor,
    /// Falls back to the inferred configuration when unset
    pub kubeconfig: Option<PathBuf>,
    pub timeout: Duration,
    pub dry_run: bool,
    pub output: Output,
}
