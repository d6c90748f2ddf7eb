//! Launcher configuration
//!
//! Everything the launcher downloads, unpacks, and runs is named here. The
//! defaults reproduce the stock PyV setup on Windows; a `launcher.toml` in the
//! launcher root (or `--config <file>`) overrides any subset of it.
//!
//! ```toml
//! [runtime]
//! url = "https://github.com/astral-sh/uv/releases/latest/download/uv-x86_64-pc-windows-msvc.zip"
//! executable = "uv.exe"
//!
//! [app]
//! dir = "pyv"
//! run_args = ["run", "--active", "pythonw", "src/Gui.py"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the launcher root
pub const CONFIG_FILE: &str = "launcher.toml";

/// Top-level launcher configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub app: AppConfig,
}

/// Where the runtime tool (uv) comes from and where it lands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// "latest release" redirect URL of the runtime zip
    pub url: String,
    /// Downloaded archive, relative to the launcher root
    pub archive: String,
    /// Directory the executable is unpacked into
    pub dir: String,
    /// Executable file name, also the entry name inside the archive
    pub executable: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/astral-sh/uv/releases/latest/download/uv-x86_64-pc-windows-msvc.zip"
                .to_string(),
            archive: "uv.zip".to_string(),
            dir: "uv".to_string(),
            executable: "uv.exe".to_string(),
        }
    }
}

/// Where the application source comes from and how it is run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Branch archive URL
    pub url: String,
    /// Downloaded archive, relative to the launcher root
    pub archive: String,
    /// Application directory, relative to the launcher root
    pub dir: String,
    /// Any of these directories inside the app dir means dependencies are installed
    pub markers: Vec<String>,
    /// File that must exist before a dependency sync is attempted
    pub manifest: String,
    /// Arguments for the dependency sync
    pub sync_args: Vec<String>,
    /// Arguments that start the application
    pub run_args: Vec<String>,
    /// Log file for the launched application, relative to the app dir
    pub log_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/MrReDoX/pyv/archive/refs/heads/master.zip".to_string(),
            archive: "pyv-master.zip".to_string(),
            dir: "pyv".to_string(),
            markers: vec![".venv".to_string(), "venv".to_string()],
            manifest: "pyproject.toml".to_string(),
            sync_args: vec!["sync".to_string(), "--active".to_string()],
            run_args: vec![
                "run".to_string(),
                "--active".to_string(),
                "pythonw".to_string(),
                "src/Gui.py".to_string(),
            ],
            log_file: "pyv_log.txt".to_string(),
        }
    }
}

impl Config {
    /// Load configuration for a launcher root.
    ///
    /// An explicit path must exist. Without one, `<root>/launcher.toml` is
    /// used when present and the built-in defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE);
                if !candidate.exists() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runtime.executable, "uv.exe");
        assert_eq!(config.app.dir, "pyv");
        assert_eq!(config.app.markers, vec![".venv", "venv"]);
        assert_eq!(config.app.sync_args, vec!["sync", "--active"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "[app]\ndir = \"myapp\"\nlog_file = \"out.log\"\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), None).unwrap();
        assert_eq!(config.app.dir, "myapp");
        assert_eq!(config.app.log_file, "out.log");
        // Untouched fields keep their defaults
        assert_eq!(config.app.manifest, "pyproject.toml");
        assert_eq!(config.runtime, RuntimeConfig::default());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = Config::load(temp.path(), Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_invalid_toml() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[app\n").unwrap();
        let err = Config::load(temp.path(), None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[runtime]"));
        assert!(toml_str.contains("[app]"));
    }
}
