//! Image inspection for kubearch
//!
//! This crate defines the boundary to the service that decides which images
//! support ARM64, provides adapters for it, and turns its answers into an
//! [`InspectionReport`].

mod docker;
mod http;
mod orchestrator;
mod probe;
mod service;

pub use docker::{parse_manifest_platforms, DockerManifestProbe};
pub use http::HttpInspectionService;
pub use orchestrator::Orchestrator;
pub use probe::{ArchitectureProbe, ProbeInspectionService, DEFAULT_CONCURRENCY};
pub use service::{InspectionResponse, InspectionService};

// Re-export types used in our public API
pub use kubearch_types::{ArchError, ImageReference, ImageResult, InspectionReport, Summary};
