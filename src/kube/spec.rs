use anyhow::{Result, anyhow};
use k8s_openapi::api::{batch::v1::JobSpec, core::v1::Container};

pub trait SpecHandler {
    fn get_container(&self) -> Result<&Container>;
    fn get_restart_policy(&self) -> Option<&str>;
}

impl SpecHandler for JobSpec {
    fn get_container(&self) -> Result<&Container> {
        let pod_spec = self
            .template
            .spec
            .as_ref()
            .ok_or_else(|| anyhow!("Unable to found pod spec on job"))?;

        match pod_spec.containers.as_slice() {
            [container] => Ok(container),
            containers => Err(anyhow!(
                "Expected a single container on the job but found {}",
                containers.len()
            )),
        }
    }

    fn get_restart_policy(&self) -> Option<&str> {
        self.template
            .spec
            .as_ref()
            .and_then(|spec| spec.restart_policy.as_deref())
    }
}
