use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kubearch_types::{ArchError, ImageReference, ImageResult, Summary};

/// Response of the inspection service: one result per submitted reference
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResponse {
    pub results: Vec<ImageResult>,

    #[serde(default)]
    pub summary: Summary,

    #[serde(default)]
    pub scan_time: String,
}

/// Service that determines the architectures an image is published for
#[async_trait]
pub trait InspectionService: Send + Sync {
    /// Inspect every reference in one round trip
    async fn inspect(&self, request: &[ImageReference]) -> Result<InspectionResponse, ArchError>;
}

#[async_trait]
impl<T: InspectionService + ?Sized> InspectionService for Box<T> {
    async fn inspect(&self, request: &[ImageReference]) -> Result<InspectionResponse, ArchError> {
        (**self).inspect(request).await
    }
}
