use thiserror::Error;

/// Failures that end an inspection run
///
/// Each variant needs a different remedy, so callers surface them
/// separately instead of collapsing them into one message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchError {
    /// Malformed kubeconfig, cluster document or report
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// The cluster query failed (transport or auth)
    #[error("cluster query failed: {0}")]
    Scan(String),

    /// The cluster query succeeded but found no container images
    #[error("no container images found in context '{context}' (namespace: {namespace})")]
    EmptyResult { context: String, namespace: String },

    /// Inspection was requested without any image references
    #[error("no image references to inspect")]
    NoInput,

    /// The inspection service failed
    #[error("inspection failed: {0}")]
    Inspection(String),
}

impl ArchError {
    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Short hint on how to fix the failure
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "Check the kubeconfig or input document for syntax errors.",
            Self::Scan(_) => "Check cluster connectivity and credentials for the selected context.",
            Self::EmptyResult { .. } | Self::NoInput => {
                "Nothing to inspect. Try another namespace or context."
            }
            Self::Inspection(_) => "Check that the inspection service is reachable.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_cause() {
        let err = ArchError::Scan("connection refused".into());
        assert_eq!(err.to_string(), "cluster query failed: connection refused");

        let err = ArchError::parse("kubeconfig", "missing 'contexts'");
        assert_eq!(err.to_string(), "failed to parse kubeconfig: missing 'contexts'");
    }

    #[test]
    fn test_remediation_differs() {
        let scan = ArchError::Scan(String::new()).remediation();
        let inspect = ArchError::Inspection(String::new()).remediation();
        let parse = ArchError::parse("x", "y").remediation();
        assert_ne!(scan, inspect);
        assert_ne!(scan, parse);
        assert_eq!(
            ArchError::NoInput.remediation(),
            ArchError::EmptyResult {
                context: "a".into(),
                namespace: "b".into()
            }
            .remediation()
        );
    }
}
