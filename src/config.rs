//! Configuration file for kubearch
//!
//! Read from `--config` or `<config dir>/kubearch/config.toml`. Every key is
//! optional; command line flags take precedence over the file.
//!
//! ```toml
//! kubeconfig = "/home/me/.kube/config"
//!
//! [inspection]
//! service_url = "http://127.0.0.1:8080"
//! timeout_secs = 120
//! concurrency = 10
//! probe_program = "podman"
//!
//! [report]
//! page_size = 25
//!
//! [export]
//! directory = "reports"
//! prefix = "kubearchinspect"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use kubearch_inspect::DEFAULT_CONCURRENCY;
use kubearch_report::{DEFAULT_EXPORT_PREFIX, DEFAULT_PAGE_SIZE};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Kubeconfig to read instead of the default location
    pub kubeconfig: Option<PathBuf>,
    pub inspection: InspectionConfig,
    pub report: ReportConfig,
    pub export: ExportConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InspectionConfig {
    /// Remote inspection service; when unset images are probed locally
    pub service_url: Option<String>,
    pub timeout_secs: u64,
    /// Images probed at once by the local prober
    pub concurrency: usize,
    /// Docker-compatible CLI used by the local prober
    pub probe_program: Option<String>,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            timeout_secs: 120,
            concurrency: DEFAULT_CONCURRENCY,
            probe_program: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub page_size: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            prefix: DEFAULT_EXPORT_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kubearch").join("config.toml"))
    }

    /// Load the file at `path`, or the default file if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.kubeconfig.is_none());
        assert!(config.inspection.service_url.is_none());
        assert_eq!(config.inspection.timeout_secs, 120);
        assert_eq!(config.inspection.concurrency, 10);
        assert_eq!(config.report.page_size, 25);
        assert_eq!(config.export.prefix, "kubearchinspect");
        assert_eq!(config.export.directory, PathBuf::from("."));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
kubeconfig = "/tmp/kube"

[inspection]
service_url = "http://inspector:8080"

[export]
directory = "reports"
"#,
        )
        .unwrap();

        assert_eq!(config.kubeconfig, Some(PathBuf::from("/tmp/kube")));
        assert_eq!(
            config.inspection.service_url.as_deref(),
            Some("http://inspector:8080")
        );
        assert_eq!(config.inspection.concurrency, 10);
        assert_eq!(config.export.directory, PathBuf::from("reports"));
        assert_eq!(config.export.prefix, "kubearchinspect");
    }

    #[test]
    fn test_probe_program() {
        let config = Config::from_toml("[inspection]\nprobe_program = \"podman\"\n").unwrap();
        assert_eq!(config.inspection.probe_program.as_deref(), Some("podman"));
        assert_eq!(config.inspection.timeout_secs, 120);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("[report]\nrows = 3\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/kubearch.toml"))).is_err());
    }
}
