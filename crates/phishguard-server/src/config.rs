//! Service configuration

use crate::cli::Cli;
use phishguard_classifiers::DetectorConfig;
use phishguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::info;

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Corpus, model and schema locations
    #[serde(flatten)]
    pub detector: DetectorConfig,

    /// HTTP behaviour
    #[serde(default)]
    pub server: ServerSettings,

    /// Address for the Prometheus exporter; disabled when unset
    #[serde(default)]
    pub metrics_listen: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides.
    ///
    /// A missing file falls back to defaults; an unreadable or malformed one
    /// is an error.
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            info!("No config file at {}, using defaults", config_path);
            Self::default()
        };

        // Apply CLI overrides
        if let Some(corpus) = &cli.corpus {
            config.detector.corpus_path = corpus.clone();
        }

        if let Some(model) = &cli.model {
            config.detector.model_path = model.clone();
        }

        if let Some(schema) = &cli.schema {
            config.detector.schema_path = Some(schema.clone());
        }

        if let Some(addr) = &cli.metrics_listen {
            config.metrics_listen = Some(addr.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail at first use
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;

        if self.server.max_body_bytes == 0 {
            return Err(Error::config("server.max_body_bytes must be greater than 0"));
        }

        if let Some(addr) = &self.metrics_listen {
            addr.parse::<SocketAddr>().map_err(|e| {
                Error::config(format!("invalid metrics_listen address '{}': {}", addr, e))
            })?;
        }

        Ok(())
    }
}

/// HTTP settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Return internal failure messages to callers
    #[serde(default = "default_true")]
    pub expose_error_details: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            expose_error_details: true,
        }
    }
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["phishguard-server"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServiceConfig::load("/nonexistent/phishguard.yaml", &cli(&[])).unwrap();

        assert_eq!(config.detector, DetectorConfig::default());
        assert_eq!(config.server, ServerSettings::default());
        assert_eq!(config.server.max_body_bytes, 65536);
        assert!(config.metrics_listen.is_none());
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishguard.yaml");
        std::fs::write(
            &path,
            r#"
corpus_path: /srv/words.txt
model_path: /srv/model.json
schema_path: /srv/columns.json
server:
  max_body_bytes: 1024
  expose_error_details: false
metrics_listen: 127.0.0.1:9000
"#,
        )
        .unwrap();

        let config = ServiceConfig::load(path.to_str().unwrap(), &cli(&[])).unwrap();
        assert_eq!(config.detector.corpus_path, PathBuf::from("/srv/words.txt"));
        assert_eq!(config.detector.schema_path, Some(PathBuf::from("/srv/columns.json")));
        assert_eq!(config.server.max_body_bytes, 1024);
        assert!(!config.server.expose_error_details);
        assert_eq!(config.metrics_listen.as_deref(), Some("127.0.0.1:9000"));
    }

    #[test]
    fn test_partial_server_section_keeps_defaults() {
        let config: ServiceConfig = serde_yaml::from_str("server:\n  max_body_bytes: 10\n").unwrap();
        assert_eq!(config.server.max_body_bytes, 10);
        assert!(config.server.expose_error_details);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishguard.yaml");
        std::fs::write(&path, "model_path: /srv/model.json\n").unwrap();

        let config = ServiceConfig::load(
            path.to_str().unwrap(),
            &cli(&["--model", "/override/model.json", "--corpus", "/override/words.txt"]),
        )
        .unwrap();

        assert_eq!(config.detector.model_path, PathBuf::from("/override/model.json"));
        assert_eq!(config.detector.corpus_path, PathBuf::from("/override/words.txt"));
    }

    #[test]
    fn test_rejects_zero_body_limit() {
        let mut config = ServiceConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_metrics_address() {
        let config = ServiceConfig {
            metrics_listen: Some("not an address".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phishguard.yaml");
        std::fs::write(&path, "server: [1, 2").unwrap();

        assert!(ServiceConfig::load(path.to_str().unwrap(), &cli(&[])).is_err());
    }
}
