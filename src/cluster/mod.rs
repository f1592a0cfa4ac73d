//! TZ-012: Cluster inventory — trenza.yaml schema, parsing, validation.
//!
//! A cluster is a static, named list of hosts. There is no discovery and
//! no health tracking; the file is the truth.

pub mod fanout;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration — the host inventory for fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Human-readable cluster name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Host inventory (order-preserving)
    #[serde(default)]
    pub hosts: IndexMap<String, Host>,
}

/// A target host for command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Network address (IP or DNS)
    pub addr: String,

    /// SSH user
    #[serde(default = "default_user")]
    pub user: String,

    /// Path to SSH private key
    #[serde(default)]
    pub ssh_key: Option<String>,

    /// Roles for this host (fan-out filtering)
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_user() -> String {
    "root".to_string()
}

impl Host {
    /// The local machine.
    pub fn local() -> Self {
        Self {
            addr: "127.0.0.1".to_string(),
            user: default_user(),
            ssh_key: None,
            roles: Vec::new(),
        }
    }

    /// Parse an ad-hoc `user@addr` (or bare `addr`) spec.
    pub fn from_spec(spec: &str) -> Self {
        match spec.split_once('@') {
            Some((user, addr)) => Self {
                addr: addr.to_string(),
                user: user.to_string(),
                ssh_key: None,
                roles: Vec::new(),
            },
            None => Self {
                addr: spec.to_string(),
                user: default_user(),
                ssh_key: None,
                roles: Vec::new(),
            },
        }
    }

    /// The `user@addr` login string.
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.addr)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a trenza.yaml file from disk.
pub fn parse_cluster_file(path: &Path) -> Result<ClusterConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_cluster(&content)
}

/// Parse a trenza.yaml from a string.
pub fn parse_cluster(yaml: &str) -> Result<ClusterConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed cluster. Returns a list of errors (empty = valid).
pub fn validate_cluster(config: &ClusterConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", config.version),
        });
    }

    if config.name.is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    for (name, host) in &config.hosts {
        if host.addr.is_empty() {
            errors.push(ValidationError {
                message: format!("host '{}' has no addr", name),
            });
        }
        if host.user.is_empty() {
            errors.push(ValidationError {
                message: format!("host '{}' has an empty user", name),
            });
        }
        if let Some(ref key) = host.ssh_key {
            if key.is_empty() {
                errors.push(ValidationError {
                    message: format!("host '{}' has an empty ssh_key", name),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tz012_parse_valid() {
        let yaml = r#"
version: "1.0"
name: lab
hosts:
  web1:
    addr: 10.0.0.1
    user: deploy
    roles: [web]
  db1:
    addr: 10.0.0.2
"#;
        let config = parse_cluster(yaml).unwrap();
        assert_eq!(config.name, "lab");
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts["web1"].user, "deploy");
        assert_eq!(config.hosts["db1"].user, "root");
        assert!(validate_cluster(&config).is_empty());
    }

    #[test]
    fn test_tz012_bad_version() {
        let config = parse_cluster("version: \"2.0\"\nname: x\nhosts: {}\n").unwrap();
        let errors = validate_cluster(&config);
        assert!(errors.iter().any(|e| e.message.contains("version")));
    }

    #[test]
    fn test_tz012_empty_name() {
        let config = parse_cluster("version: \"1.0\"\nname: \"\"\nhosts: {}\n").unwrap();
        let errors = validate_cluster(&config);
        assert!(errors.iter().any(|e| e.message.contains("name")));
    }

    #[test]
    fn test_tz012_host_without_addr() {
        let yaml = r#"
version: "1.0"
name: lab
hosts:
  ghost:
    addr: ""
"#;
        let config = parse_cluster(yaml).unwrap();
        let errors = validate_cluster(&config);
        assert!(errors.iter().any(|e| e.message.contains("no addr")));
    }

    #[test]
    fn test_tz012_parse_invalid_yaml() {
        assert!(parse_cluster("not: [valid: yaml: {{").is_err());
    }

    #[test]
    fn test_tz012_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trenza.yaml");
        std::fs::write(&path, "version: \"1.0\"\nname: file-test\nhosts: {}\n").unwrap();
        let config = parse_cluster_file(&path).unwrap();
        assert_eq!(config.name, "file-test");
    }

    #[test]
    fn test_tz012_host_spec() {
        let h = Host::from_spec("ana@web1.lan");
        assert_eq!(h.user, "ana");
        assert_eq!(h.addr, "web1.lan");
        assert_eq!(h.login(), "ana@web1.lan");

        let bare = Host::from_spec("web2.lan");
        assert_eq!(bare.user, "root");
        assert_eq!(bare.addr, "web2.lan");
    }

    #[test]
    fn test_tz012_roles() {
        let mut h = Host::local();
        assert!(!h.has_role("gpu"));
        h.roles.push("gpu".to_string());
        assert!(h.has_role("gpu"));
    }
}
