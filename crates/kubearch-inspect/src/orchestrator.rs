use chrono::Utc;
use tracing::{debug, info};

use kubearch_types::{ArchError, ImageReference, InspectionReport, NamespaceScope, Summary};

use crate::service::InspectionService;

/// Sends image references to the inspection service and builds the report
///
/// Performs exactly one service call per run and never retries; a failed
/// run produces no report.
pub struct Orchestrator<S> {
    service: S,
}

impl<S: InspectionService> Orchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn inspect(
        &self,
        references: &[ImageReference],
        context: &str,
        scope: &NamespaceScope,
    ) -> Result<InspectionReport, ArchError> {
        if references.is_empty() {
            return Err(ArchError::NoInput);
        }

        info!(context, %scope, images = references.len(), "inspecting images");
        let response = self.service.inspect(references).await?;

        if response.results.len() != references.len() {
            return Err(ArchError::Inspection(format!(
                "service returned {} results for {} images",
                response.results.len(),
                references.len()
            )));
        }

        let mut results = response.results;
        for result in results.iter_mut().filter(|r| r.has_error()) {
            result.is_arm_compatible = false;
        }

        let report = InspectionReport::new(results, Utc::now(), context.to_string(), scope.to_string());

        let local = report.summary();
        if response.summary != Summary::default() && response.summary != *local {
            debug!(upstream = ?response.summary, local = ?local, "service summary disagrees with results");
        }
        info!(
            total = local.total,
            compatible = local.arm_compatible,
            incompatible = local.not_compatible,
            errors = local.errors,
            "inspection finished"
        );

        Ok(report)
    }
}
