use super::TemplateSpecOps;
use crate::kube::descriptor::JobDescriptor;
use k8s_openapi::api::batch::v1::{JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}

fn non_empty_map(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.clone())
}

impl TemplateSpecOps for JobDescriptor {
    fn get_template_spec(&self) -> JobTemplateSpec {
        let container = Container {
            name: self.name.clone(),
            image: Some(self.image.clone()),
            command: non_empty(&self.command),
            args: non_empty(&self.args),
            ..Default::default()
        };

        // Pods carry the job metadata so they can be selected the same way
        let pod_template = PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: non_empty_map(&self.labels),
                annotations: non_empty_map(&self.annotations),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![container],
                restart_policy: Some(self.restart_policy.as_str().to_string()),
                ..Default::default()
            }),
        };

        JobTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: non_empty_map(&self.labels),
                annotations: non_empty_map(&self.annotations),
                ..Default::default()
            }),
            spec: Some(JobSpec {
                template: pod_template,
                backoff_limit: self.backoff_limit,
                ttl_seconds_after_finished: self.ttl_seconds_after_finished,
                ..Default::default()
            }),
        }
    }
}
