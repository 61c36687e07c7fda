//! Plain-text listing of a report page on stdout

use std::fmt::Write;

use kubearch_report::ReportPage;
use kubearch_types::{CompatibilityStatus, ImageResult, InspectionReport};

fn status_label(result: &ImageResult) -> &'static str {
    match result.status() {
        CompatibilityStatus::Compatible => "ARM64",
        CompatibilityStatus::Incompatible => "NO-ARM64",
        CompatibilityStatus::Errored => "ERROR",
    }
}

fn architectures(result: &ImageResult) -> String {
    match (result.error(), result.supported_architectures.is_empty()) {
        (Some(error), _) => error.to_string(),
        (None, true) => "unknown".to_string(),
        (None, false) => result.supported_architectures.join(", "),
    }
}

/// Summary header followed by one aligned row per result on the page
pub fn render(report: &InspectionReport, page: &ReportPage) -> String {
    let summary = report.summary();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Context: {}  Namespace: {}  Scanned: {}",
        report.context(),
        report.namespace(),
        report.scan_time().format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Images: {}  ARM64: {} ({:.0}%)  Not compatible: {}  Errors: {}",
        summary.total,
        summary.arm_compatible,
        summary.compatible_percentage(),
        summary.not_compatible,
        summary.errors
    );

    if page.items.is_empty() {
        let _ = writeln!(out, "\nNo matching images.");
        return out;
    }

    let image_width = page
        .items
        .iter()
        .map(|r| r.image.len())
        .max()
        .unwrap_or_default()
        .max("IMAGE".len());
    let resource_width = page
        .items
        .iter()
        .map(|r| r.namespace.len() + r.resource_kind.as_str().len() + r.resource_name.len() + 2)
        .max()
        .unwrap_or_default()
        .max("RESOURCE".len());

    let _ = writeln!(
        out,
        "\n{:<8}  {:<image_width$}  {:<resource_width$}  ARCHITECTURES",
        "STATUS", "IMAGE", "RESOURCE"
    );
    for result in &page.items {
        let resource = format!(
            "{}/{}/{}",
            result.namespace, result.resource_kind, result.resource_name
        );
        let _ = writeln!(
            out,
            "{:<8}  {:<image_width$}  {:<resource_width$}  {}",
            status_label(result),
            result.image,
            resource,
            architectures(result)
        );
    }

    let _ = writeln!(
        out,
        "\nPage {} of {} ({} matching)",
        page.page + 1,
        page.page_count.max(1),
        page.matching
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kubearch_types::{ImageReference, ResourceKind};

    #[test]
    fn test_render_rows() {
        let reference =
            ImageReference::new("alpine:3.18".into(), ResourceKind::Pod, "tools".into(), "default".into());
        let results = vec![
            ImageResult::inspected(&reference, vec!["amd64".into(), "arm64".into()]),
            ImageResult::failed(&reference, "manifest unknown"),
        ];
        let report = InspectionReport::new(results.clone(), Utc::now(), "prod".into(), "all".into());
        let page = ReportPage {
            items: results,
            matching: 2,
            page: 0,
            page_count: 1,
        };

        let text = render(&report, &page);
        assert!(text.contains("Context: prod  Namespace: all"));
        assert!(text.contains("Images: 2  ARM64: 1 (50%)  Not compatible: 0  Errors: 1"));
        assert!(text.contains("default/Pod/tools"));
        assert!(text.contains("amd64, arm64"));
        assert!(text.contains("manifest unknown"));
        assert!(text.contains("Page 1 of 1 (2 matching)"));
    }

    #[test]
    fn test_render_empty_page() {
        let report = InspectionReport::new(Vec::new(), Utc::now(), "prod".into(), "all".into());
        let page = ReportPage {
            items: Vec::new(),
            matching: 0,
            page: 3,
            page_count: 0,
        };
        assert!(render(&report, &page).contains("No matching images."));
    }
}
