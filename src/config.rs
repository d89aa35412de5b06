use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::{CurateError, Result};
use crate::pipeline::classify::MeasureCatalog;

/// Run configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Root directory for the response cache and the persistent stores.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Topic count override for topic-model measures; measures that publish
    /// a default use it when this is unset.
    #[serde(default)]
    pub topic_count: Option<usize>,

    /// Measures to run, in order. A missing threshold falls back to the
    /// measure's published default.
    #[serde(default = "default_measures")]
    pub measures: Vec<MeasureSetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureSetting {
    pub name: String,
    #[serde(default)]
    pub threshold: Option<f64>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_measures() -> Vec<MeasureSetting> {
    vec![
        MeasureSetting { name: "bytecount".to_string(), threshold: None },
        MeasureSetting { name: "wordcount".to_string(), threshold: None },
    ]
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            topic_count: None,
            measures: default_measures(),
        }
    }
}

impl CuratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_root.join("response_cache")
    }

    /// Resolves the configured measures against a catalog into concrete
    /// `(name, threshold)` pairs for the classification engine.
    pub fn resolved_measures(&self, catalog: &MeasureCatalog) -> Result<Vec<(String, f64)>> {
        let mut resolved = Vec::with_capacity(self.measures.len());
        for setting in &self.measures {
            let definition = catalog.get(&setting.name).ok_or_else(|| {
                CurateError::Config(format!("unknown measure: {}", setting.name))
            })?;
            let threshold = setting
                .threshold
                .or(definition.default_threshold)
                .ok_or_else(|| {
                    CurateError::Config(format!(
                        "measure {} has no default threshold, one must be configured",
                        setting.name
                    ))
                })?;
            resolved.push((setting.name.clone(), threshold));
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::measures::DEFAULT_WORDCOUNT_THRESHOLD;

    #[test]
    fn parses_full_config() {
        let config: CuratorConfig = toml::from_str(
            r#"
            data_root = "/tmp/curator"
            topic_count = 20

            [[measures]]
            name = "bytecount"
            threshold = -0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/tmp/curator"));
        assert_eq!(config.topic_count, Some(20));
        assert_eq!(config.measures.len(), 1);
        assert_eq!(config.measures[0].threshold, Some(-0.5));
    }

    #[test]
    fn missing_thresholds_resolve_to_published_defaults() {
        let config = CuratorConfig::default();
        let resolved = config.resolved_measures(&MeasureCatalog::builtin()).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1], ("wordcount".to_string(), DEFAULT_WORDCOUNT_THRESHOLD));
    }

    #[test]
    fn unknown_measures_are_a_config_error() {
        let mut config = CuratorConfig::default();
        config.measures.push(MeasureSetting {
            name: "gensim_lda".to_string(),
            threshold: None,
        });
        assert!(config.resolved_measures(&MeasureCatalog::builtin()).is_err());
    }
}
