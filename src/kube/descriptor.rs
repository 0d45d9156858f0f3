use crate::error::{JobError, Result};
use std::collections::BTreeMap;

pub const DEFAULT_JOB_NAME: &str = "batch-job";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_IMAGE: &str = "luksa/batch-job";

// Job names end up in the pod labels, so they follow the DNS-1123 label rules
const MAX_NAME_LEN: usize = 63;

/// Restart policy of the pods spawned by the job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    #[default]
    OnFailure,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::OnFailure => "OnFailure",
        }
    }
}

/// Everything needed to build the job sent to the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub image: String,
    /// Entrypoint override, empty keeps the image default
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub restart_policy: RestartPolicy,
    pub backoff_limit: Option<i32>,
    pub ttl_seconds_after_finished: Option<i32>,
}

impl Default for JobDescriptor {
    fn default() -> Self {
        Self {
            name: DEFAULT_JOB_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            image: DEFAULT_IMAGE.to_string(),
            command: Vec::new(),
            args: Vec::new(),
            restart_policy: RestartPolicy::default(),
            backoff_limit: None,
            ttl_seconds_after_finished: None,
        }
    }
}

impl JobDescriptor {
    /// Create a descriptor running the given image under the default name and namespace
    ///
    /// # Arguments
    ///
    /// * `image` - S
    pub fn new<S: Into<String>>(image: S) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }

    /// Namespace the job is submitted to, falling back to the default one when left empty
    pub fn namespace(&self) -> &str {
        match self.namespace.trim() {
            "" => DEFAULT_NAMESPACE,
            ns => ns,
        }
    }

    /// Check the descriptor before anything is sent to the cluster
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        if self.image.trim().is_empty() {
            return Err(JobError::Validation(
                "the container image can't be empty".to_string(),
            ));
        }

        if self.image.chars().any(char::is_whitespace) {
            return Err(JobError::Validation(format!(
                "the container image {:?} contains whitespace",
                self.image
            )));
        }

        if let Some(key) = self
            .labels
            .keys()
            .chain(self.annotations.keys())
            .find(|key| key.trim().is_empty())
        {
            return Err(JobError::Validation(format!(
                "metadata key {key:?} can't be empty"
            )));
        }

        for (field, value) in [
            ("backoff limit", self.backoff_limit),
            ("ttl after finished", self.ttl_seconds_after_finished),
        ] {
            if value.is_some_and(|v| v < 0) {
                return Err(JobError::Validation(format!("{field} can't be negative")));
            }
        }

        Ok(())
    }
}

/// Check that a job name is a valid DNS-1123 label
///
/// # Arguments
///
/// * `name` - &str
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(JobError::Validation("the job name can't be empty".to_string()));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(JobError::Validation(format!(
            "the job name {name:?} is longer than {MAX_NAME_LEN} characters"
        )));
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let valid = name.chars().all(allowed)
        && name.starts_with(alnum)
        && name.ends_with(alnum);

    if !valid {
        return Err(JobError::Validation(format!(
            "the job name {name:?} must consist of lower case alphanumeric characters or '-', and start and end with an alphanumeric character"
        )));
    }

    Ok(())
}
