//! Import configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. CLI flags override whatever the file says.
//!
//! ```toml
//! base_url = "http://localhost:8080/api"
//! timeout_secs = 30
//! result_seed = 1
//! progress_interval = 50
//! link_policy = "first-creation"
//! label_policy = "exact"
//! max_task_depth = 32
//! max_field_depth = 3
//! taxonomy_root = "Research Field"
//! structure_links = false
//! fail_fast = false
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::import::LinkPolicy;
use crate::registry::LabelPolicy;

/// Errors from loading or saving the config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(pgi::config::read),
        help("Ensure the config file exists and is readable, or drop --config to use defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(pgi::config::parse),
        help("Check the TOML syntax. Valid policies are \"first-creation\"/\"every-call\" and \"exact\"/\"case-insensitive\".")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(pgi::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Root of the graph API; endpoint paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Unset keeps the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// First number used for `Res_<n>` result labels.
    #[serde(default = "default_result_seed")]
    pub result_seed: u64,
    /// Log a progress line every this many records.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// When the paper → implementation link is written.
    #[serde(default)]
    pub link_policy: LinkPolicy,
    /// How labels are compared when deduplicating.
    #[serde(default)]
    pub label_policy: LabelPolicy,
    /// Deepest task nesting processed; deeper subtasks are skipped.
    #[serde(default = "default_max_task_depth")]
    pub max_task_depth: usize,
    /// Deepest taxonomy nesting processed.
    #[serde(default = "default_max_field_depth")]
    pub max_field_depth: usize,
    /// Resource the top-level research fields hang off. An empty string leaves them unattached.
    #[serde(default = "default_taxonomy_root")]
    pub taxonomy_root: Option<String>,
    /// Also write `has dataset` / `has subtask` links between tasks.
    #[serde(default)]
    pub structure_links: bool,
    /// Abort on the first failed record instead of recording it and moving on.
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".into()
}
fn default_result_seed() -> u64 {
    1
}
fn default_progress_interval() -> usize {
    50
}
fn default_max_task_depth() -> usize {
    32
}
fn default_max_field_depth() -> usize {
    3
}
fn default_taxonomy_root() -> Option<String> {
    Some("Research Field".into())
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
            result_seed: default_result_seed(),
            progress_interval: default_progress_interval(),
            link_policy: LinkPolicy::default(),
            label_policy: LabelPolicy::default(),
            max_task_depth: default_max_task_depth(),
            max_field_depth: default_max_field_depth(),
            taxonomy_root: default_taxonomy_root(),
            structure_links: false,
            fail_fast: false,
        }
    }
}

impl ImportConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Request timeout as a `Duration`, if configured.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs.map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: ImportConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, ImportConfig::default());
        assert_eq!(cfg.progress_interval, 50);
        assert_eq!(cfg.taxonomy_root.as_deref(), Some("Research Field"));
        assert!(cfg.timeout().is_none());
    }

    #[test]
    fn policies_parse_from_kebab_case() {
        let cfg: ImportConfig = toml::from_str(
            r#"
link_policy = "every-call"
label_policy = "case-insensitive"
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(cfg.link_policy, LinkPolicy::EveryCall);
        assert_eq!(cfg.label_policy, LabelPolicy::CaseInsensitive);
        assert_eq!(cfg.timeout(), Some(std::time::Duration::from_secs(5)));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "link_policy = \"sometimes\"\n").unwrap();
        assert!(matches!(
            ImportConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn config_roundtrip_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/import.toml");

        let cfg = ImportConfig {
            base_url: "http://graph.example/api".into(),
            result_seed: 1000,
            fail_fast: true,
            ..Default::default()
        };
        cfg.save(&path).unwrap();

        let loaded = ImportConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ImportConfig::load(Path::new("/nonexistent/import.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
