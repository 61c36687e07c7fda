use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use kubearch_types::{ArchError, KubeContext};

const KUBECONFIG: &str = "kubeconfig";

/// Parse kubeconfig YAML text into a generic document
pub fn parse_kubeconfig_yaml(text: &str) -> Result<Value, ArchError> {
    serde_yaml::from_str(text).map_err(|e| ArchError::parse(KUBECONFIG, e))
}

/// Extract the contexts declared by a kubeconfig document
///
/// The entry named by `current-context` is marked current. When that key is
/// absent or names no entry, no context is marked; picking a default is up
/// to the caller (see [`ContextCatalog::new`]).
pub fn parse_contexts(raw: &Value) -> Result<Vec<KubeContext>, ArchError> {
    let root = raw
        .as_object()
        .ok_or_else(|| ArchError::parse(KUBECONFIG, "document is not a mapping"))?;

    let entries = match root.get("contexts") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ArchError::parse(KUBECONFIG, "'contexts' is not a sequence")),
        None => return Err(ArchError::parse(KUBECONFIG, "missing 'contexts'")),
    };

    let current = root.get("current-context").and_then(Value::as_str);
    let mut seen = HashSet::new();
    let mut contexts = Vec::with_capacity(entries.len());

    for (idx, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ArchError::parse(KUBECONFIG, format!("context #{} has no name", idx)))?;

        if !seen.insert(name) {
            warn!(context = name, "ignoring duplicate context entry");
            continue;
        }

        let context = entry.get("context");
        let field = |key: &str| {
            context
                .and_then(|c| c.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        contexts.push(KubeContext::new(
            name.to_string(),
            field("cluster").unwrap_or_default(),
            field("user").unwrap_or_default(),
            field("namespace"),
            Some(name) == current,
        ));
    }

    Ok(contexts)
}

/// Contexts available for selection, with exactly one marked current
#[derive(Clone, Debug, Default)]
pub struct ContextCatalog {
    contexts: Vec<KubeContext>,
}

impl ContextCatalog {
    /// Build a catalog, falling back to the first context as current
    pub fn new(mut contexts: Vec<KubeContext>) -> Self {
        if !contexts.iter().any(|c| c.is_current) {
            if let Some(first) = contexts.first_mut() {
                first.is_current = true;
            }
        }
        Self { contexts }
    }

    /// Build a catalog from a kubeconfig document
    ///
    /// A malformed document yields an empty catalog ("no contexts
    /// available") rather than an error.
    pub fn from_document(raw: &Value) -> Self {
        match parse_contexts(raw) {
            Ok(contexts) => Self::new(contexts),
            Err(e) => {
                warn!(error = %e, "kubeconfig has no usable contexts");
                Self::default()
            }
        }
    }

    pub fn contexts(&self) -> &[KubeContext] {
        &self.contexts
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn get(&self, name: &str) -> Option<&KubeContext> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn current(&self) -> Option<&KubeContext> {
        self.contexts.iter().find(|c| c.is_current)
    }

    /// Resolve the context to use: the named one, or the current one
    pub fn select(&self, name: Option<&str>) -> Result<&KubeContext, ArchError> {
        match name {
            Some(name) => self.get(name).ok_or_else(|| {
                ArchError::parse(KUBECONFIG, format!("context '{}' not found", name))
            }),
            None => self
                .current()
                .ok_or_else(|| ArchError::parse(KUBECONFIG, "no contexts available")),
        }
    }
}
