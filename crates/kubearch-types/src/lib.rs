//! Shared types for kubearch
//!
//! This crate contains the data model used across the kubearch crates:
//! kubeconfig contexts, image references produced by the workload scanner,
//! per-image inspection results and the aggregate report.

mod error;

pub use error::ArchError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace assumed for a context that does not declare one
pub const DEFAULT_NAMESPACE: &str = "default";

// ============================================================================
// Kubernetes Context Types
// ============================================================================

/// Kubernetes context information
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KubeContext {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: String,
    pub is_current: bool,
}

impl KubeContext {
    pub fn new(
        name: String,
        cluster: String,
        user: String,
        namespace: Option<String>,
        is_current: bool,
    ) -> Self {
        Self {
            name,
            cluster,
            user,
            namespace: namespace
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            is_current,
        }
    }
}

/// Which namespaces a scan covers
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum NamespaceScope {
    #[default]
    All,
    Namespace(String),
}

impl NamespaceScope {
    /// Check whether an object in `namespace` falls inside this scope
    pub fn contains(&self, namespace: &str) -> bool {
        match self {
            Self::All => true,
            Self::Namespace(ns) => ns == namespace,
        }
    }
}

impl FromStr for NamespaceScope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "*" => Self::All,
            s if s.eq_ignore_ascii_case("all") => Self::All,
            s => Self::Namespace(s.to_string()),
        })
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Namespace(ns) => f.write_str(ns),
        }
    }
}

// ============================================================================
// Workload / Image Types
// ============================================================================

/// Kind of workload resource that runs containers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Pod,
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
}

impl ResourceKind {
    /// Every kind the scanner queries, in query order
    pub const ALL: [ResourceKind; 6] = [
        Self::Pod,
        Self::Deployment,
        Self::StatefulSet,
        Self::DaemonSet,
        Self::Job,
        Self::CronJob,
    ];

    /// Kubernetes `kind` string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pod => "Pod",
            Self::Deployment => "Deployment",
            Self::StatefulSet => "StatefulSet",
            Self::DaemonSet => "DaemonSet",
            Self::Job => "Job",
            Self::CronJob => "CronJob",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ArchError::parse("workload", format!("unsupported kind '{}'", s)))
    }
}

/// One usage of a container image by a workload, a candidate for inspection
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    pub image: String,
    pub resource_kind: ResourceKind,
    pub resource_name: String,
    pub namespace: String,
}

/// Identity of an [`ImageReference`]: `(kind, namespace, name, image)`
pub type ReferenceKey<'a> = (ResourceKind, &'a str, &'a str, &'a str);

impl ImageReference {
    pub fn new(
        image: String,
        resource_kind: ResourceKind,
        resource_name: String,
        namespace: String,
    ) -> Self {
        Self {
            image,
            resource_kind,
            resource_name,
            namespace,
        }
    }

    pub fn key(&self) -> ReferenceKey<'_> {
        (
            self.resource_kind,
            &self.namespace,
            &self.resource_name,
            &self.image,
        )
    }
}

/// Check whether an architecture string (optionally `arch/variant`) is ARM64
pub fn is_arm64_architecture(arch: &str) -> bool {
    let base = arch.split('/').next().unwrap_or(arch);
    base.eq_ignore_ascii_case("arm64") || base.eq_ignore_ascii_case("aarch64")
}

// ============================================================================
// Inspection Result Types
// ============================================================================

/// Mutually exclusive classification of an inspected image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompatibilityStatus {
    Compatible,
    Incompatible,
    Errored,
}

/// Inspection outcome for a single image reference
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub image: String,

    pub is_arm_compatible: bool,

    /// Platforms published for the image, e.g. `amd64`, `arm/v7`
    #[serde(default, alias = "supportedArch")]
    pub supported_architectures: Vec<String>,

    #[serde(alias = "resourceType")]
    pub resource_kind: ResourceKind,

    pub resource_name: String,

    pub namespace: String,

    /// Set when inspection failed; compatibility is then unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageResult {
    /// Build a successful result for a reference
    pub fn inspected(reference: &ImageReference, supported_architectures: Vec<String>) -> Self {
        let is_arm_compatible = supported_architectures
            .iter()
            .any(|arch| is_arm64_architecture(arch));
        Self {
            image: reference.image.clone(),
            is_arm_compatible,
            supported_architectures,
            resource_kind: reference.resource_kind,
            resource_name: reference.resource_name.clone(),
            namespace: reference.namespace.clone(),
            error: None,
        }
    }

    /// Build a failed result for a reference
    pub fn failed(reference: &ImageReference, error: impl Into<String>) -> Self {
        Self {
            image: reference.image.clone(),
            is_arm_compatible: false,
            supported_architectures: Vec::new(),
            resource_kind: reference.resource_kind,
            resource_name: reference.resource_name.clone(),
            namespace: reference.namespace.clone(),
            error: Some(error.into()),
        }
    }

    /// Error text, if the inspection failed (empty strings count as no error)
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    pub fn has_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn status(&self) -> CompatibilityStatus {
        if self.has_error() {
            CompatibilityStatus::Errored
        } else if self.is_arm_compatible {
            CompatibilityStatus::Compatible
        } else {
            CompatibilityStatus::Incompatible
        }
    }
}

/// Counts derived from a set of results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub arm_compatible: usize,
    pub not_compatible: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_results(results: &[ImageResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match result.status() {
                CompatibilityStatus::Compatible => summary.arm_compatible += 1,
                CompatibilityStatus::Incompatible => summary.not_compatible += 1,
                CompatibilityStatus::Errored => summary.errors += 1,
            }
        }

        summary
    }

    /// Share of compatible images, in percent
    pub fn compatible_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.arm_compatible as f64 * 100.0 / self.total as f64
        }
    }
}

/// Immutable outcome of one inspection run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    results: Vec<ImageResult>,
    summary: Summary,
    scan_time: DateTime<Utc>,
    context: String,
    namespace: String,
}

impl InspectionReport {
    /// Create a report; the summary is always derived from `results`
    pub fn new(
        results: Vec<ImageResult>,
        scan_time: DateTime<Utc>,
        context: String,
        namespace: String,
    ) -> Self {
        let summary = Summary::from_results(&results);
        Self {
            results,
            summary,
            scan_time,
            context,
            namespace,
        }
    }

    pub fn results(&self) -> &[ImageResult] {
        &self.results
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn scan_time(&self) -> DateTime<Utc> {
        self.scan_time
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check that the stored summary matches the results (relevant for
    /// reports decoded from external text)
    pub fn is_consistent(&self) -> bool {
        self.summary == Summary::from_results(&self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(image: &str) -> ImageReference {
        ImageReference::new(
            image.to_string(),
            ResourceKind::Deployment,
            "web".to_string(),
            "ns1".to_string(),
        )
    }

    #[test]
    fn test_context_namespace_defaults() {
        let ctx = KubeContext::new("dev".into(), "c".into(), "u".into(), None, false);
        assert_eq!(ctx.namespace, "default");

        let ctx = KubeContext::new("dev".into(), "c".into(), "u".into(), Some("apps".into()), true);
        assert_eq!(ctx.namespace, "apps");
    }

    #[test]
    fn test_namespace_scope_parsing() {
        assert_eq!("all".parse::<NamespaceScope>().unwrap(), NamespaceScope::All);
        assert_eq!("".parse::<NamespaceScope>().unwrap(), NamespaceScope::All);
        assert_eq!(
            "kube-system".parse::<NamespaceScope>().unwrap(),
            NamespaceScope::Namespace("kube-system".into())
        );
        assert_eq!(NamespaceScope::All.to_string(), "all");
        assert!(NamespaceScope::All.contains("anything"));
        assert!(!NamespaceScope::Namespace("a".into()).contains("b"));
    }

    #[test]
    fn test_resource_kind_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("ReplicaSet".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_arm64_detection() {
        assert!(is_arm64_architecture("arm64"));
        assert!(is_arm64_architecture("arm64/v8"));
        assert!(is_arm64_architecture("aarch64"));
        assert!(!is_arm64_architecture("arm/v7"));
        assert!(!is_arm64_architecture("amd64"));
    }

    #[test]
    fn test_summary_partition() {
        let r = reference("alpine:3.18");
        let mut errored = ImageResult::failed(&r, "manifest unknown");
        errored.is_arm_compatible = true;
        let results = vec![
            ImageResult::inspected(&r, vec!["amd64".into(), "arm64".into()]),
            ImageResult::inspected(&r, vec!["amd64".into()]),
            errored,
        ];

        let summary = Summary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.arm_compatible, 1);
        assert_eq!(summary.not_compatible, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(
            summary.arm_compatible + summary.not_compatible + summary.errors,
            summary.total
        );
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let mut result = ImageResult::inspected(&reference("nginx"), vec!["amd64".into()]);
        result.error = Some(String::new());
        assert_eq!(result.status(), CompatibilityStatus::Incompatible);
    }

    #[test]
    fn test_result_accepts_legacy_field_names() {
        let value = serde_json::json!({
            "image": "nginx:1.25",
            "isArmCompatible": true,
            "supportedArch": ["amd64", "arm64"],
            "resourceType": "Pod",
            "resourceName": "nginx",
            "namespace": "default"
        });
        let result: ImageResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.resource_kind, ResourceKind::Pod);
        assert_eq!(result.supported_architectures, vec!["amd64", "arm64"]);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_report_summary_is_derived() {
        let r = reference("alpine:3.18");
        let report = InspectionReport::new(
            vec![ImageResult::inspected(&r, vec!["amd64".into(), "arm64".into()])],
            Utc::now(),
            "prod".into(),
            "all".into(),
        );
        assert_eq!(
            *report.summary(),
            Summary {
                total: 1,
                arm_compatible: 1,
                not_compatible: 0,
                errors: 0
            }
        );
        assert!(report.is_consistent());
    }
}
