use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use kubearch_types::{ArchError, ImageReference, ImageResult, Summary};

use crate::service::{InspectionResponse, InspectionService};

/// Default number of images probed at the same time
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Looks up the platforms a single image is published for
#[async_trait]
pub trait ArchitectureProbe: Send + Sync {
    /// Architectures as `arch` or `arch/variant`; `Err` carries a message
    /// that ends up in the result's `error` field
    async fn architectures(&self, image: &str) -> Result<Vec<String>, String>;
}

/// Inspection service that probes images locally
///
/// Each distinct image string is probed once, however many workloads use
/// it, with at most `concurrency` probes in flight.
pub struct ProbeInspectionService<P> {
    probe: P,
    concurrency: usize,
}

impl<P: ArchitectureProbe> ProbeInspectionService<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

#[async_trait]
impl<P: ArchitectureProbe> InspectionService for ProbeInspectionService<P> {
    async fn inspect(&self, request: &[ImageReference]) -> Result<InspectionResponse, ArchError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = request
            .iter()
            .map(|r| r.image.as_str())
            .filter(|image| seen.insert(*image))
            .collect();

        debug!(
            references = request.len(),
            images = unique.len(),
            concurrency = self.concurrency,
            "probing images"
        );

        let probe = &self.probe;
        let probes: Vec<_> = unique
            .into_iter()
            .map(move |image| async move { (image, probe.architectures(image).await) })
            .collect();
        let outcomes: HashMap<&str, Result<Vec<String>, String>> = stream::iter(probes)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let results: Vec<ImageResult> = request
            .iter()
            .map(|reference| match outcomes.get(reference.image.as_str()) {
                Some(Ok(architectures)) => ImageResult::inspected(reference, architectures.clone()),
                Some(Err(e)) => {
                    warn!(image = %reference.image, error = %e, "image probe failed");
                    ImageResult::failed(reference, e.clone())
                }
                None => ImageResult::failed(reference, "image was not probed"),
            })
            .collect();

        Ok(InspectionResponse {
            summary: Summary::from_results(&results),
            results,
            scan_time: Utc::now().to_rfc3339(),
        })
    }
}
