use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level project configuration loaded from `.apidoc.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApidocConfig {
    pub limits: Limits,
    pub companion: CompanionConfig,
    pub defaults: DefaultsConfig,
}

/// Bounds on a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum schema nesting depth reached through `$ref` hops.
    pub max_depth: usize,
    /// Maximum number of distinct files read while resolving one operation.
    pub max_files: usize,
    /// Maximum number of `$ref` expansions performed for one operation.
    pub max_expansions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_files: 256,
            max_expansions: 4096,
        }
    }
}

/// Where previously authored companion documents live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// File name suffix appended to the endpoint/method stem.
    pub suffix: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            suffix: "_read.md".to_string(),
        }
    }
}

/// Placeholder values used when nothing better is known.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Source annotation given to request fields before the merge.
    pub source: String,
    /// Schema name shown in the algorithm narrative when the request has none.
    pub request_schema: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            source: "Direct input".to_string(),
            request_schema: "RequestDto".to_string(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apidoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApidocConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApidocConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apidoc configuration
limits:
  max_depth: 32        # deepest $ref chain followed per operation
  max_files: 256       # distinct files read per operation
  max_expansions: 4096 # $ref expansions per operation

companion:
  suffix: _read.md     # <endpoint>_<method>_read.md next to the endpoint file

defaults:
  source: Direct input
  request_schema: RequestDto
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApidocConfig::default();
        assert_eq!(config.limits.max_depth, 32);
        assert_eq!(config.limits.max_files, 256);
        assert_eq!(config.limits.max_expansions, 4096);
        assert_eq!(config.companion.suffix, "_read.md");
        assert_eq!(config.defaults.source, "Direct input");
        assert_eq!(config.defaults.request_schema, "RequestDto");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
limits:
  max_depth: 4
  max_files: 10
companion:
  suffix: .doc.md
defaults:
  source: Client
"#;
        let config: ApidocConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            config.limits,
            Limits {
                max_depth: 4,
                max_files: 10,
                max_expansions: 4096,
            }
        );
        assert_eq!(config.companion.suffix, ".doc.md");
        assert_eq!(config.defaults.source, "Client");
        // Unset keys keep their defaults
        assert_eq!(config.defaults.request_schema, "RequestDto");
    }

    #[test]
    fn test_default_content_parses() {
        let config: ApidocConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.companion.suffix, "_read.md");
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }
}
