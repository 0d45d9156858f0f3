use k8s_openapi::api::batch::v1::JobTemplateSpec;

pub mod descriptor;

pub trait TemplateSpecOps {
    /// Get the job template spec for a targeted workload
    fn get_template_spec(&self) -> JobTemplateSpec;
}
