//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level rigspec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigspecConfig {
    /// History log that `--save` appends to.
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    /// Project code stamped on saved calculations.
    #[serde(default = "default_project")]
    pub default_project: String,
    /// Engineer name printed on reports.
    #[serde(default)]
    pub engineer: String,
    /// Identity recorded in history lock files.
    #[serde(default = "default_lock_user")]
    pub lock_user: String,
}

fn default_history_path() -> PathBuf {
    PathBuf::from("rigspec-history.rsh")
}
fn default_project() -> String {
    "UNASSIGNED".to_string()
}
fn default_lock_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "rigspec".to_string())
}

impl Default for RigspecConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            default_project: default_project(),
            engineer: String::new(),
            lock_user: default_lock_user(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `rigspec.toml` in the current directory
/// 2. `~/.config/rigspec/config.toml`
///
/// Environment variable overrides: `RIGSPEC_HISTORY`, `RIGSPEC_PROJECT`.
pub fn load_config_from(path: Option<&Path>) -> Result<RigspecConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from("rigspec.toml")), dirs_path().map(|d| d.join("config.toml"))]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<RigspecConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => RigspecConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut RigspecConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(history) = var("RIGSPEC_HISTORY").filter(|v| !v.is_empty()) {
        config.history_path = PathBuf::from(history);
    }
    if let Some(project) = var("RIGSPEC_PROJECT").filter(|v| !v.is_empty()) {
        config.default_project = project;
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("rigspec"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RigspecConfig::default();
        assert_eq!(config.history_path, PathBuf::from("rigspec-history.rsh"));
        assert_eq!(config.default_project, "UNASSIGNED");
        assert!(config.engineer.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let config: RigspecConfig = toml::from_str(
            r#"
engineer = "R. Singh"
default_project = "BRK-2024"
"#,
        )
        .unwrap();
        assert_eq!(config.engineer, "R. Singh");
        assert_eq!(config.default_project, "BRK-2024");
        assert_eq!(config.history_path, PathBuf::from("rigspec-history.rsh"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = RigspecConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "RIGSPEC_HISTORY" => Some("/tmp/other.rsh".to_string()),
            "RIGSPEC_PROJECT" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.history_path, PathBuf::from("/tmp/other.rsh"));
        assert_eq!(config.default_project, "UNASSIGNED");
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/rigspec.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "lock_user = \"bench-3\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.lock_user, "bench-3");
    }
}
