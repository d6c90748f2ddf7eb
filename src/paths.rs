//! Single source of truth for the launcher's filesystem layout.
//!
//! This module defines WHERE artifacts live. It has no I/O and no business
//! logic; presence checks happen in the steps that own each artifact.
//!
//! ```text
//! <root>/
//! ├── uv.zip                   # Runtime archive
//! ├── uv/uv.exe                # Runtime executable
//! ├── pyv-master.zip           # Application archive
//! └── pyv/                     # Application directory
//!     ├── uv.exe               # Local runtime copy
//!     ├── pyproject.toml       # Manifest
//!     ├── .venv/ | venv/       # Dependency environment marker
//!     └── pyv_log.txt          # Launched app output
//! ```

use std::path::{Path, PathBuf};

use crate::config::Config;

/// Absolute paths of every artifact, resolved against a launcher root
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: PathBuf,
    pub runtime_url: String,
    pub runtime_archive: PathBuf,
    pub runtime_dir: PathBuf,
    pub runtime_exe: PathBuf,
    /// Entry name of the executable inside the runtime archive
    pub runtime_entry: String,
    pub app_url: String,
    pub app_archive: PathBuf,
    pub app_dir: PathBuf,
    pub local_runtime: PathBuf,
    pub markers: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub log_file: PathBuf,
    pub sync_args: Vec<String>,
    pub run_args: Vec<String>,
}

impl Layout {
    /// Join every configured relative path onto `root`
    pub fn resolve(root: &Path, config: &Config) -> Self {
        let runtime = &config.runtime;
        let app = &config.app;

        let runtime_dir = root.join(&runtime.dir);
        let app_dir = root.join(&app.dir);

        Self {
            root: root.to_path_buf(),
            runtime_url: runtime.url.clone(),
            runtime_archive: root.join(&runtime.archive),
            runtime_exe: runtime_dir.join(&runtime.executable),
            runtime_dir,
            runtime_entry: runtime.executable.clone(),
            app_url: app.url.clone(),
            app_archive: root.join(&app.archive),
            local_runtime: app_dir.join(&runtime.executable),
            markers: app.markers.iter().map(|m| app_dir.join(m)).collect(),
            manifest: app_dir.join(&app.manifest),
            log_file: app_dir.join(&app.log_file),
            app_dir,
            sync_args: app.sync_args.clone(),
            run_args: app.run_args.clone(),
        }
    }

    /// First dependency marker that exists, if any
    pub fn installed_marker(&self) -> Option<&Path> {
        self.markers.iter().find(|m| m.exists()).map(PathBuf::as_path)
    }
}

/// Sibling path with `suffix` appended to the file name: `uv.zip` -> `uv.zip.part`
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}
