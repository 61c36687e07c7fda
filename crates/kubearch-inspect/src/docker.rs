//! Architecture probe backed by the docker CLI

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::probe::ArchitectureProbe;

/// Probes images with `docker manifest inspect --verbose`
#[derive(Clone, Debug)]
pub struct DockerManifestProbe {
    program: String,
}

impl DockerManifestProbe {
    pub fn new() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }

    /// Use a different docker-compatible binary (e.g. `podman`)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DockerManifestProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchitectureProbe for DockerManifestProbe {
    async fn architectures(&self, image: &str) -> Result<Vec<String>, String> {
        debug!(image, program = %self.program, "inspecting manifest");

        let output = tokio::process::Command::new(&self.program)
            .args(["manifest", "inspect", "--verbose", image])
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("failed to fetch image: {}", stderr.trim()));
        }

        parse_manifest_platforms(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract `arch[/variant]` strings from `docker manifest inspect` output
///
/// Accepts the verbose form (one descriptor object, or an array of them for
/// multi-platform images) and the plain manifest-list form with a
/// `manifests` array. Attestation entries (`unknown` architecture) are
/// skipped and duplicates collapse.
pub fn parse_manifest_platforms(output: &str) -> Result<Vec<String>, String> {
    let value: Value =
        serde_json::from_str(output).map_err(|e| format!("invalid manifest output: {}", e))?;

    let descriptors: Vec<&Value> = match &value {
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| entry.get("Descriptor"))
            .collect(),
        Value::Object(obj) => match (obj.get("Descriptor"), obj.get("manifests")) {
            (Some(descriptor), _) => vec![descriptor],
            (None, Some(Value::Array(manifests))) => manifests.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut architectures: Vec<String> = Vec::new();
    for platform in descriptors.iter().filter_map(|d| d.get("platform")) {
        let Some(arch) = platform.get("architecture").and_then(Value::as_str) else {
            continue;
        };
        if arch.is_empty() || arch == "unknown" {
            continue;
        }

        let arch = match platform.get("variant").and_then(Value::as_str) {
            Some(variant) if !variant.is_empty() => format!("{}/{}", arch, variant),
            _ => arch.to_string(),
        };
        if !architectures.contains(&arch) {
            architectures.push(arch);
        }
    }

    if architectures.is_empty() {
        return Err("manifest does not declare any platform".to_string());
    }

    Ok(architectures)
}
