use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use kubearch_types::{ArchError, ImageReference};

use crate::service::{InspectionResponse, InspectionService};

/// Inspection service reached over HTTP: `POST {base_url}/inspect`
pub struct HttpInspectionService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInspectionService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ArchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArchError::Inspection(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: inspect_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn inspect_endpoint(base_url: &str) -> String {
    format!("{}/inspect", base_url.trim_end_matches('/'))
}

#[async_trait]
impl InspectionService for HttpInspectionService {
    async fn inspect(&self, request: &[ImageReference]) -> Result<InspectionResponse, ArchError> {
        debug!(endpoint = %self.endpoint, images = request.len(), "sending inspection request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ArchError::Inspection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchError::Inspection(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    format!("service refused the request ({})", status)
                }
                _ if body.trim().is_empty() => format!("service returned {}", status),
                _ => format!("service returned {}: {}", status, body.trim()),
            }));
        }

        response
            .json::<InspectionResponse>()
            .await
            .map_err(|e| ArchError::Inspection(format!("invalid response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubearch_types::ResourceKind;

    #[test]
    fn test_endpoint_joining() {
        assert_eq!(inspect_endpoint("http://localhost:8080"), "http://localhost:8080/inspect");
        assert_eq!(inspect_endpoint("http://localhost:8080/"), "http://localhost:8080/inspect");
        assert_eq!(inspect_endpoint("http://host/api/"), "http://host/api/inspect");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_inspection_error() {
        let service =
            HttpInspectionService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let request = [ImageReference::new(
            "alpine:3.18".into(),
            ResourceKind::Pod,
            "a".into(),
            "default".into(),
        )];

        let err = service.inspect(&request).await.unwrap_err();
        assert!(matches!(err, ArchError::Inspection(_)));
    }
}
