use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Container, Pod, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde_json::Value;

use kubearch_types::{ArchError, ResourceKind};

/// A workload resource as returned by the cluster
#[derive(Clone, Debug)]
pub enum Workload {
    Pod(Pod),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Job(Job),
    CronJob(CronJob),
}

impl Workload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pod(_) => ResourceKind::Pod,
            Self::Deployment(_) => ResourceKind::Deployment,
            Self::StatefulSet(_) => ResourceKind::StatefulSet,
            Self::DaemonSet(_) => ResourceKind::DaemonSet,
            Self::Job(_) => ResourceKind::Job,
            Self::CronJob(_) => ResourceKind::CronJob,
        }
    }

    fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Pod(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::DaemonSet(o) => &o.metadata,
            Self::Job(o) => &o.metadata,
            Self::CronJob(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    /// Containers declared by this workload
    ///
    /// Pods carry them directly, controllers in their pod template, and
    /// CronJobs one level deeper inside the job template.
    pub fn containers(&self) -> &[Container] {
        let containers = match self {
            Self::Pod(pod) => pod.spec.as_ref().map(|s| s.containers.as_slice()),
            Self::Deployment(d) => d.spec.as_ref().and_then(|s| template_containers(&s.template)),
            Self::StatefulSet(s) => s.spec.as_ref().and_then(|s| template_containers(&s.template)),
            Self::DaemonSet(d) => d.spec.as_ref().and_then(|s| template_containers(&s.template)),
            Self::Job(j) => j.spec.as_ref().and_then(|s| template_containers(&s.template)),
            Self::CronJob(c) => c
                .spec
                .as_ref()
                .and_then(|s| s.job_template.spec.as_ref())
                .and_then(|s| template_containers(&s.template)),
        };
        containers.unwrap_or_default()
    }

    /// Non-empty container images, in declaration order
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.containers()
            .iter()
            .filter_map(|c| c.image.as_deref())
            .filter(|image| !image.trim().is_empty())
    }

    /// Decode one item of a cluster query document by its `kind`
    pub fn from_document(value: Value) -> Result<Self, ArchError> {
        let kind: ResourceKind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ArchError::parse("workload", "item has no 'kind'"))?
            .parse()?;

        Ok(match kind {
            ResourceKind::Pod => Self::Pod(decode(kind, value)?),
            ResourceKind::Deployment => Self::Deployment(decode(kind, value)?),
            ResourceKind::StatefulSet => Self::StatefulSet(decode(kind, value)?),
            ResourceKind::DaemonSet => Self::DaemonSet(decode(kind, value)?),
            ResourceKind::Job => Self::Job(decode(kind, value)?),
            ResourceKind::CronJob => Self::CronJob(decode(kind, value)?),
        })
    }
}

fn template_containers(template: &PodTemplateSpec) -> Option<&[Container]> {
    template.spec.as_ref().map(|s| s.containers.as_slice())
}

fn decode<T: DeserializeOwned>(kind: ResourceKind, value: Value) -> Result<T, ArchError> {
    serde_json::from_value(value).map_err(|e| ArchError::parse(format!("{} item", kind), e))
}

/// Decode a cluster query document: a `List` with `items`, a bare array,
/// or a single workload object
pub fn parse_workload_list(document: Value) -> Result<Vec<Workload>, ArchError> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("items") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(ArchError::parse("workload list", "'items' is not a sequence")),
            None => vec![Value::Object(obj)],
        },
        Value::Null => Vec::new(),
        _ => return Err(ArchError::parse("workload list", "document is not a mapping")),
    };

    items.into_iter().map(Workload::from_document).collect()
}
