//! Kubernetes integration for kubearch
//!
//! This crate parses kubeconfig contexts, connects to a cluster for a
//! selected context, and scans workloads for the container images they run.

mod catalog;
mod client;
mod scanner;
mod workload;

pub use catalog::{parse_contexts, parse_kubeconfig_yaml, ContextCatalog};
pub use client::{default_kubeconfig_path, KubeClient};
pub use scanner::{
    extract_image_references, DocumentWorkloadSource, KubeWorkloadSource, WorkloadScanner,
    WorkloadSource,
};
pub use workload::{parse_workload_list, Workload};

// Re-export types that are used in our public API
pub use kubearch_types::{ArchError, ImageReference, KubeContext, NamespaceScope, ResourceKind};
