use crate::error::{JobError, Operation, Result};
use k8s_openapi::api::batch::v1::Job;
use kube::{
    Client, Config,
    api::{Api, DeleteParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
};
use serde_json::json;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use template::TemplateSpecOps;
use tracing::debug;

pub(crate) mod descriptor;
pub(crate) mod spec;
pub(crate) mod template;

pub use descriptor::JobDescriptor;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The part of the cluster API used to create and delete jobs
pub trait JobApi {
    async fn create_job(&self, namespace: &str, job: &Job, dry_run: bool) -> Result<Job>;
    async fn delete_job(&self, namespace: &str, name: &str, dry_run: bool) -> Result<()>;
}

/// Jobs API of a real cluster
#[derive(Clone)]
pub struct KubeJobApi {
    client: Client,
}

impl KubeJobApi {
    /// Connect with the given kubeconfig, or with the inferred configuration when none is given
    ///
    /// # Arguments
    ///
    /// * `kubeconfig` - Option<&Path>
    pub async fn new(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                debug!(path = %path.display(), "loading kubeconfig");
                let kubeconfig = Kubeconfig::read_from(path).map_err(|err| {
                    JobError::Connection(format!(
                        "unable to read kubeconfig {}: {err}",
                        path.display()
                    ))
                })?;

                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|err| JobError::Connection(err.to_string()))?
            }
            None => Config::infer()
                .await
                .map_err(|err| JobError::Connection(err.to_string()))?,
        };

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        debug!(cluster = %config.cluster_url, "building cluster client");
        let client = Client::try_from(config).map_err(|err| JobError::Connection(err.to_string()))?;

        Ok(Self { client })
    }
}

impl JobApi for KubeJobApi {
    async fn create_job(&self, namespace: &str, job: &Job, dry_run: bool) -> Result<Job> {
        let job_api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        let mut pp = PostParams::default();

        if dry_run {
            pp.dry_run = true;
        }

        let name = job.metadata.name.clone().unwrap_or_default();
        job_api
            .create(&pp, job)
            .await
            .map_err(|err| JobError::from_kube(Operation::Create, err, &name, namespace))
    }

    async fn delete_job(&self, namespace: &str, name: &str, dry_run: bool) -> Result<()> {
        let job_api: Api<Job> = Api::namespaced(self.client.clone(), namespace);
        // Background propagation lets the garbage collector remove the job pods
        let mut dp = DeleteParams::background();

        if dry_run {
            dp.dry_run = true;
        }

        job_api
            .delete(name, &dp)
            .await
            .map(|_| ())
            .map_err(|err| JobError::from_kube(Operation::Delete, err, name, namespace))
    }
}

/// Build the batch job sent to the cluster from a descriptor
///
/// # Arguments
///
/// * `descriptor` - &JobDescriptor
pub fn build_job(descriptor: &JobDescriptor) -> Result<Job> {
    let mut job: Job = serde_json::from_value(json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": descriptor.name,
            "namespace": descriptor.namespace(),
        },
        "spec": {}
    }))
    .map_err(|err| JobError::Validation(err.to_string()))?;

    let template = descriptor.get_template_spec();
    if let Some(metadata) = template.metadata {
        job.metadata.labels = metadata.labels;
        job.metadata.annotations = metadata.annotations;
    }
    job.spec = template.spec;

    Ok(job)
}

/// Submits or removes a single job, one API call per operation
pub struct JobSubmissionClient<A: JobApi> {
    api: A,
    timeout: Duration,
    dry_run: bool,
}

impl<A> JobSubmissionClient<A>
where
    A: JobApi,
{
    /// Create a new instance of the JobSubmissionClient
    ///
    /// # Arguments
    ///
    /// * `api` - A
    /// * `timeout` - deadline applied to each API call
    pub fn new(api: A, timeout: Duration) -> Self {
        Self {
            api,
            timeout,
            dry_run: false,
        }
    }

    /// Ask the server to validate the requests without persisting anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Create the job described by the descriptor and return the job echoed by the server
    ///
    /// # Arguments
    ///
    /// * `descriptor` - &JobDescriptor
    pub async fn submit(&self, descriptor: &JobDescriptor) -> Result<Job> {
        descriptor.validate()?;
        let job = build_job(descriptor)?;
        let namespace = descriptor.namespace();

        debug!(
            name = %descriptor.name,
            namespace,
            image = %descriptor.image,
            dry_run = self.dry_run,
            "creating job"
        );

        self.with_deadline(self.api.create_job(namespace, &job, self.dry_run))
            .await
            .inspect_err(|err| debug!(%err, "job creation failed"))
    }

    /// Delete the job, the cluster tears down its pods asynchronously
    ///
    /// # Arguments
    ///
    /// * `name` - N
    /// * `namespace` - S
    pub async fn remove<N: AsRef<str>, S: AsRef<str>>(&self, name: N, namespace: S) -> Result<()> {
        let (name, namespace) = (name.as_ref(), namespace.as_ref());

        if name.trim().is_empty() {
            return Err(JobError::Validation("the job name can't be empty".to_string()));
        }

        if namespace.trim().is_empty() {
            return Err(JobError::Validation(
                "the job namespace can't be empty".to_string(),
            ));
        }

        debug!(name, namespace, dry_run = self.dry_run, "deleting job");

        self.with_deadline(self.api.delete_job(namespace, name, self.dry_run))
            .await
            .inspect_err(|err| debug!(%err, "job deletion failed"))
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| JobError::deadline(self.timeout))?
    }
}
