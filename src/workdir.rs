//! Scoped change of the process working directory

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Restores the previous working directory when dropped, including on error paths
#[derive(Debug)]
pub struct WorkingDir {
    original: PathBuf,
}

impl WorkingDir {
    /// Change into `dir` until the returned guard is dropped
    pub fn enter(dir: &Path) -> Result<Self> {
        let original = env::current_dir().context("Failed to read current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        Ok(Self { original })
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original);
    }
}
