//! Kubernetes client for kubearch

use k8s_openapi::api::core::v1::Namespace;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Api;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use kubearch_types::{ArchError, KubeContext};

use crate::catalog::{parse_kubeconfig_yaml, ContextCatalog};

/// Locate the kubeconfig file: first `$KUBECONFIG` entry, else `~/.kube/config`
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    if let Some(paths) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

/// Kubernetes client wrapper
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    catalog: ContextCatalog,
}

impl KubeClient {
    /// Load the kubeconfig from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self, ArchError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(default_kubeconfig_path)
            .ok_or_else(|| ArchError::parse("kubeconfig", "could not locate a kubeconfig file"))?;

        debug!(path = %path.display(), "reading kubeconfig");
        let text = std::fs::read_to_string(&path).map_err(|e| {
            ArchError::parse("kubeconfig", format!("{}: {}", path.display(), e))
        })?;

        Self::from_yaml(&text)
    }

    /// Build a client from kubeconfig YAML text
    ///
    /// Text that is not YAML at all is an error. A YAML document that is
    /// not a usable kubeconfig yields an empty catalog.
    pub fn from_yaml(text: &str) -> Result<Self, ArchError> {
        let document = parse_kubeconfig_yaml(text)?;
        let (kubeconfig, catalog) = match Kubeconfig::from_yaml(text) {
            Ok(kubeconfig) => (kubeconfig, ContextCatalog::from_document(&document)),
            Err(e) => {
                warn!(error = %e, "kubeconfig is not usable, no contexts available");
                (Kubeconfig::default(), ContextCatalog::default())
            }
        };

        Ok(Self {
            kubeconfig,
            catalog,
        })
    }

    pub fn catalog(&self) -> &ContextCatalog {
        &self.catalog
    }

    /// Get all available contexts from kubeconfig
    pub fn contexts(&self) -> &[KubeContext] {
        self.catalog.contexts()
    }

    /// Create a kube::Client for a specific context
    pub async fn client_for_context(&self, context_name: &str) -> Result<kube::Client, ArchError> {
        let config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| {
            ArchError::Scan(format!(
                "failed to create config for context {}: {}",
                context_name, e
            ))
        })?;

        kube::Client::try_from(config).map_err(|e| {
            ArchError::Scan(format!(
                "failed to create client for context {}: {}",
                context_name, e
            ))
        })
    }

    /// Fetch the names of all namespaces in the cluster
    pub async fn namespaces(&self, client: &kube::Client) -> Result<Vec<String>, ArchError> {
        let namespaces: Api<Namespace> = Api::all(client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(|e| ArchError::Scan(format!("failed to list namespaces: {}", e)))?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG_YAML: &str = r#"
apiVersion: v1
kind: Config
current-context: kind-arm
clusters:
  - name: kind-arm
    cluster:
      server: https://127.0.0.1:6443
users:
  - name: kind-arm
    user:
      token: abc
contexts:
  - name: kind-arm
    context:
      cluster: kind-arm
      user: kind-arm
      namespace: apps
"#;

    #[test]
    fn test_from_yaml_builds_catalog() {
        let client = KubeClient::from_yaml(KUBECONFIG_YAML).unwrap();
        let contexts = client.contexts();

        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].name, "kind-arm");
        assert_eq!(contexts[0].namespace, "apps");
        assert!(contexts[0].is_current);
    }

    #[test]
    fn test_from_yaml_rejects_garbage() {
        assert!(matches!(
            KubeClient::from_yaml("contexts: [unclosed"),
            Err(ArchError::Parse { .. })
        ));
    }

    #[test]
    fn test_from_yaml_malformed_contexts_gives_empty_catalog() {
        let client = KubeClient::from_yaml("apiVersion: v1\nkind: Config\ncontexts: 42\n").unwrap();
        assert!(client.catalog().is_empty());
        assert!(client.contexts().is_empty());
    }

    #[test]
    fn test_from_yaml_unnamed_context_gives_empty_catalog() {
        let yaml = "apiVersion: v1\nkind: Config\ncontexts:\n  - context:\n      cluster: c\n      user: u\n";
        let client = KubeClient::from_yaml(yaml).unwrap();
        assert!(client.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_cannot_connect() {
        let client = KubeClient::from_yaml("contexts: 42\n").unwrap();
        assert!(matches!(
            client.client_for_context("anything").await,
            Err(ArchError::Scan(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let missing = Path::new("/nonexistent/kubearch/kubeconfig");
        assert!(matches!(
            KubeClient::load(Some(missing)),
            Err(ArchError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_client_for_unknown_context_is_scan_error() {
        let client = KubeClient::from_yaml(KUBECONFIG_YAML).unwrap();
        assert!(matches!(
            client.client_for_context("missing").await,
            Err(ArchError::Scan(_))
        ));
    }
}
