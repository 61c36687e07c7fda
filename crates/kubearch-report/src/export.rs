use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use kubearch_types::{ArchError, ImageResult, InspectionReport};

/// File name prefix for exported reports
pub const DEFAULT_EXPORT_PREFIX: &str = "kubearchinspect";

const CSV_HEADER: [&str; 7] = [
    "Image",
    "ARM64 Compatible",
    "Architectures",
    "Resource Type",
    "Resource Name",
    "Namespace",
    "Error",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma-separated values
    Delimited,
    /// Pretty-printed JSON
    Structured,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Delimited => "csv",
            Self::Structured => "json",
        }
    }

    /// Render a report in this format
    pub fn render(&self, report: &InspectionReport) -> Result<String, ArchError> {
        match self {
            Self::Delimited => Ok(report_to_delimited_text(report)),
            Self::Structured => to_structured_text(report),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Delimited),
            "json" => Ok(Self::Structured),
            other => Err(ArchError::parse("export format", format!("unknown format '{}'", other))),
        }
    }
}

/// `{prefix}-{YYYY-MM-DD}.{ext}`
pub fn export_file_name(prefix: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!("{}-{}.{}", prefix, date.format("%Y-%m-%d"), format.extension())
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// CSV with a header row and one quoted row per result
pub fn to_delimited_text(results: &[ImageResult]) -> String {
    let mut lines = Vec::with_capacity(results.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for result in results {
        let fields: [&str; 7] = [
            result.image.as_str(),
            if result.is_arm_compatible { "Yes" } else { "No" },
            &result.supported_architectures.join("; "),
            result.resource_kind.as_str(),
            &result.resource_name,
            &result.namespace,
            result.error().unwrap_or_default(),
        ];
        lines.push(fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

pub fn report_to_delimited_text(report: &InspectionReport) -> String {
    to_delimited_text(report.results())
}

/// Full report as indented JSON
pub fn to_structured_text(report: &InspectionReport) -> Result<String, ArchError> {
    serde_json::to_string_pretty(report).map_err(|e| ArchError::parse("report", e))
}

/// Parse a report produced by [`to_structured_text`]
pub fn from_structured_text(text: &str) -> Result<InspectionReport, ArchError> {
    let report: InspectionReport =
        serde_json::from_str(text).map_err(|e| ArchError::parse("report", e))?;

    if !report.is_consistent() {
        return Err(ArchError::parse("report", "summary does not match results"));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kubearch_types::{ImageReference, ResourceKind};

    fn report() -> InspectionReport {
        let web = ImageReference::new(
            "alpine:3.18".into(),
            ResourceKind::Deployment,
            "web".into(),
            "ns1".into(),
        );
        let db = ImageReference::new(
            "registry.local/db:\"beta\"".into(),
            ResourceKind::StatefulSet,
            "db".into(),
            "data".into(),
        );
        InspectionReport::new(
            vec![
                ImageResult::inspected(&web, vec!["amd64".into(), "arm64".into()]),
                ImageResult::failed(&db, "Failed to fetch image: \"unauthorized\""),
            ],
            Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
            "prod".into(),
            "all".into(),
        )
    }

    #[test]
    fn test_delimited_text() {
        let csv = report_to_delimited_text(&report());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Image,ARM64 Compatible,Architectures,Resource Type,Resource Name,Namespace,Error"
        );
        assert_eq!(
            lines[1],
            r#""alpine:3.18","Yes","amd64; arm64","Deployment","web","ns1","""#
        );
        assert_eq!(
            lines[2],
            r#""registry.local/db:""beta""","No","","StatefulSet","db","data","Failed to fetch image: ""unauthorized""""#
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_delimited_text_empty() {
        assert_eq!(to_delimited_text(&[]).lines().count(), 1);
    }

    #[test]
    fn test_structured_text_round_trip() {
        let original = report();
        let text = to_structured_text(&original).unwrap();
        let parsed = from_structured_text(&text).unwrap();

        assert_eq!(parsed, original);
        assert_eq!(to_structured_text(&parsed).unwrap(), text);
    }

    #[test]
    fn test_structured_text_field_order() {
        let text = to_structured_text(&report()).unwrap();
        let positions: Vec<usize> = ["\"results\"", "\"summary\"", "\"scanTime\"", "\"context\"", "\"namespace\": \"all\""]
            .iter()
            .map(|key| text.find(key).unwrap())
            .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("\"scanTime\": \"2026-10-19T08:30:00Z\""));
        assert!(text.contains("\n  \"summary\""));
    }

    #[test]
    fn test_inconsistent_summary_rejected() {
        let text = to_structured_text(&report())
            .unwrap()
            .replace("\"errors\": 1", "\"errors\": 0");
        assert!(from_structured_text(&text).is_err());
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            export_file_name(DEFAULT_EXPORT_PREFIX, date, ExportFormat::Delimited),
            "kubearchinspect-2026-10-19.csv"
        );
        assert_eq!(
            export_file_name("arm", date, ExportFormat::Structured),
            "arm-2026-10-19.json"
        );
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Structured);
    }
}
