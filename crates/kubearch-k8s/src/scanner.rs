use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

use kubearch_types::{ArchError, ImageReference, NamespaceScope, ResourceKind};

use crate::client::KubeClient;
use crate::workload::{parse_workload_list, Workload};

/// Something that can list the workloads of one cluster context
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    async fn list_workloads(&self, scope: &NamespaceScope) -> Result<Vec<Workload>, ArchError>;
}

#[async_trait]
impl<T: WorkloadSource + ?Sized> WorkloadSource for Box<T> {
    async fn list_workloads(&self, scope: &NamespaceScope) -> Result<Vec<Workload>, ArchError> {
        (**self).list_workloads(scope).await
    }
}

/// Lists workloads from a live cluster through the Kubernetes API
pub struct KubeWorkloadSource {
    client: kube::Client,
}

impl KubeWorkloadSource {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Connect to the cluster behind `context_name`
    pub async fn connect(kube_client: &KubeClient, context_name: &str) -> Result<Self, ArchError> {
        Ok(Self::new(kube_client.client_for_context(context_name).await?))
    }

    async fn list<K>(&self, kind: ResourceKind, scope: &NamespaceScope) -> Result<Vec<K>, ArchError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        };

        let list = api.list(&ListParams::default()).await.map_err(|e| {
            ArchError::Scan(format!("failed to list {} in {}: {}", kind, scope, e))
        })?;

        debug!(%kind, %scope, count = list.items.len(), "listed workloads");
        Ok(list.items)
    }
}

#[async_trait]
impl WorkloadSource for KubeWorkloadSource {
    async fn list_workloads(&self, scope: &NamespaceScope) -> Result<Vec<Workload>, ArchError> {
        let mut workloads = Vec::new();

        for kind in ResourceKind::ALL {
            match kind {
                ResourceKind::Pod => workloads.extend(
                    self.list::<Pod>(kind, scope).await?.into_iter().map(Workload::Pod),
                ),
                ResourceKind::Deployment => workloads.extend(
                    self.list::<Deployment>(kind, scope)
                        .await?
                        .into_iter()
                        .map(Workload::Deployment),
                ),
                ResourceKind::StatefulSet => workloads.extend(
                    self.list::<StatefulSet>(kind, scope)
                        .await?
                        .into_iter()
                        .map(Workload::StatefulSet),
                ),
                ResourceKind::DaemonSet => workloads.extend(
                    self.list::<DaemonSet>(kind, scope)
                        .await?
                        .into_iter()
                        .map(Workload::DaemonSet),
                ),
                ResourceKind::Job => workloads.extend(
                    self.list::<Job>(kind, scope).await?.into_iter().map(Workload::Job),
                ),
                ResourceKind::CronJob => workloads.extend(
                    self.list::<CronJob>(kind, scope)
                        .await?
                        .into_iter()
                        .map(Workload::CronJob),
                ),
            }
        }

        Ok(workloads)
    }
}

/// Serves workloads from a previously captured cluster query document
/// (e.g. `kubectl get pods,deploy,sts,ds,jobs,cronjobs -A -o json`)
#[derive(Clone, Debug, Default)]
pub struct DocumentWorkloadSource {
    workloads: Vec<Workload>,
}

impl DocumentWorkloadSource {
    pub fn new(workloads: Vec<Workload>) -> Self {
        Self { workloads }
    }

    /// Parse JSON or YAML document text
    pub fn from_text(text: &str) -> Result<Self, ArchError> {
        let document: serde_json::Value = serde_yaml::from_str(text)
            .map_err(|e| ArchError::parse("workload document", e))?;
        Ok(Self::new(parse_workload_list(document)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, ArchError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArchError::Scan(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_text(&text)
    }
}

#[async_trait]
impl WorkloadSource for DocumentWorkloadSource {
    async fn list_workloads(&self, scope: &NamespaceScope) -> Result<Vec<Workload>, ArchError> {
        Ok(self
            .workloads
            .iter()
            .filter(|w| scope.contains(w.namespace()))
            .cloned()
            .collect())
    }
}

/// Flatten workloads into image references, one per
/// `(kind, namespace, name, image)`, in first-seen order
pub fn extract_image_references(workloads: &[Workload]) -> Vec<ImageReference> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();

    for workload in workloads {
        for image in workload.images() {
            let reference = ImageReference::new(
                image.to_string(),
                workload.kind(),
                workload.name().to_string(),
                workload.namespace().to_string(),
            );
            if seen.insert(reference.clone()) {
                references.push(reference);
            }
        }
    }

    references
}

/// Scans a cluster context for the container images its workloads run
pub struct WorkloadScanner<S> {
    source: S,
}

impl<S: WorkloadSource> WorkloadScanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// List workloads in `scope` and extract their deduplicated image references
    pub async fn scan(
        &self,
        context: &str,
        scope: &NamespaceScope,
    ) -> Result<Vec<ImageReference>, ArchError> {
        let workloads = self.source.list_workloads(scope).await?;
        let references = extract_image_references(&workloads);

        info!(
            context,
            %scope,
            workloads = workloads.len(),
            images = references.len(),
            "scanned workloads"
        );

        if references.is_empty() {
            return Err(ArchError::EmptyResult {
                context: context.to_string(),
                namespace: scope.to_string(),
            });
        }

        Ok(references)
    }
}
