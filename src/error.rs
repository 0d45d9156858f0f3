use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

/// API call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
}

/// Errors that can end an invocation. None of them are retried.
#[derive(Debug, Error)]
pub enum JobError {
    /// The descriptor was rejected before or by the control plane
    #[error("invalid job: {0}")]
    Validation(String),

    /// The control plane could not be reached or refused the credentials
    #[error("unable to reach the cluster: {0}")]
    Connection(String),

    /// A job with the same name already exists in the namespace
    #[error("job {name:?} already exists in namespace {namespace:?}")]
    Conflict { name: String, namespace: String },

    /// No job with this name exists in the namespace
    #[error("job {name:?} not found in namespace {namespace:?}")]
    NotFound { name: String, namespace: String },

    /// The API call did not complete before the deadline
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl JobError {
    /// Classify a failed API call against the job identified by `name` and `namespace`
    pub fn from_kube<N, S>(op: Operation, err: kube::Error, name: N, namespace: S) -> Self
    where
        N: AsRef<str>,
        S: AsRef<str>,
    {
        match &err {
            kube::Error::Api(status) => {
                Self::from_status(op, status.code, status.message.clone(), name, namespace)
            }
            _ => Self::Connection(err.to_string()),
        }
    }

    /// Map an HTTP status returned by the control plane to an error kind
    pub fn from_status<N: AsRef<str>, S: AsRef<str>>(
        op: Operation,
        code: u16,
        message: String,
        name: N,
        namespace: S,
    ) -> Self {
        let name = name.as_ref().to_owned();
        let namespace = namespace.as_ref().to_owned();

        match code {
            400 | 422 => Self::Validation(message),
            // On create the missing resource is the namespace, not the job
            404 if op == Operation::Create => Self::Validation(message),
            404 => Self::NotFound { name, namespace },
            409 => Self::Conflict { name, namespace },
            408 | 504 => Self::Timeout(message),
            _ => Self::Connection(message),
        }
    }

    /// Deadline expiry of our own request
    pub fn deadline(after: Duration) -> Self {
        Self::Timeout(format!("no answer from the cluster within {}s", after.as_secs_f64()))
    }

    /// Sysexits-style status for this kind of error
    pub fn status(&self) -> u8 {
        match self {
            Self::Validation(_) => 65,
            Self::NotFound { .. } => 66,
            Self::Connection(_) => 69,
            Self::Conflict { .. } => 73,
            Self::Timeout(_) => 75,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        let kind = |code| {
            JobError::from_status(Operation::Delete, code, "boom".to_string(), "batch-job", "default")
        };

        assert!(matches!(kind(400), JobError::Validation(_)));
        assert!(matches!(kind(422), JobError::Validation(_)));
        assert!(matches!(kind(401), JobError::Connection(_)));
        assert!(matches!(kind(403), JobError::Connection(_)));
        assert!(matches!(kind(500), JobError::Connection(_)));
        assert!(matches!(kind(504), JobError::Timeout(_)));
        assert!(matches!(
            kind(409),
            JobError::Conflict { ref name, ref namespace } if name == "batch-job" && namespace == "default"
        ));
        assert!(matches!(kind(404), JobError::NotFound { .. }));
    }

    #[test]
    fn missing_namespace_on_create_keeps_the_server_message() {
        let err = JobError::from_status(
            Operation::Create,
            404,
            "namespaces \"nope\" not found".to_string(),
            "batch-job",
            "nope",
        );

        assert!(matches!(err, JobError::Validation(ref msg) if msg == "namespaces \"nope\" not found"));
    }

    #[test]
    fn every_kind_has_its_own_exit_code() {
        let errors = [
            JobError::Validation(String::new()),
            JobError::Connection(String::new()),
            JobError::Conflict {
                name: String::new(),
                namespace: String::new(),
            },
            JobError::NotFound {
                name: String::new(),
                namespace: String::new(),
            },
            JobError::deadline(Duration::from_secs(1)),
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.status()).collect();
        for (idx, code) in codes.iter().enumerate() {
            assert_ne!(*code, 0);
            assert_ne!(*code, 1);
            assert!(!codes[idx + 1..].contains(code));
        }
    }

    #[test]
    fn deadline_message_carries_the_duration() {
        let err = JobError::deadline(Duration::from_millis(1500));

        assert_eq!(
            err.to_string(),
            "request timed out: no answer from the cluster within 1.5s"
        );
    }

    #[test]
    fn conflict_message_names_the_job() {
        let err = JobError::Conflict {
            name: "batch-job".to_string(),
            namespace: "default".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "job \"batch-job\" already exists in namespace \"default\""
        );
    }
}
