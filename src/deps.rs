//! Dependency provisioner
//!
//! Copies the runtime next to the application and runs its dependency sync
//! once. Either marker directory (`.venv`, `venv`) means the environment is
//! already installed.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::paths::Layout;
use crate::pipeline::Outcome;

/// Runs the runtime tool's dependency sync
pub trait SyncRunner {
    /// Run `exe args...` inside `dir`, streaming its output to the console
    fn sync(&self, exe: &Path, args: &[String], dir: &Path) -> Result<()>;
}

/// Foreground subprocess with inherited stdio
pub struct ProcessSync;

impl SyncRunner for ProcessSync {
    fn sync(&self, exe: &Path, args: &[String], dir: &Path) -> Result<()> {
        let status = Command::new(exe)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to run {}", exe.display()))?;

        if !status.success() {
            bail!("{} {} failed: {}", exe.display(), args.join(" "), status);
        }
        Ok(())
    }
}

/// Copy the runtime executable into the application directory if it is not there yet
pub fn copy_runtime(layout: &Layout) -> Result<Outcome> {
    if layout.local_runtime.exists() {
        println!("✓ {} already present", layout.local_runtime.display());
        return Ok(Outcome::Present);
    }

    println!(
        "📁 Copying {} into {}...",
        layout.runtime_entry,
        layout.app_dir.display()
    );
    // fs::copy carries the permission bits over
    fs::copy(&layout.runtime_exe, &layout.local_runtime).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            layout.runtime_exe.display(),
            layout.local_runtime.display()
        )
    })?;
    println!("✅ {} copied", layout.runtime_entry);

    Ok(Outcome::Installed)
}

/// Ensure the dependency environment is installed
pub fn ensure(layout: &Layout, runner: &dyn SyncRunner) -> Result<Outcome> {
    copy_runtime(layout)?;

    if let Some(marker) = layout.installed_marker() {
        println!("✓ Dependencies already installed ({})", marker.display());
        return Ok(Outcome::Present);
    }

    if !layout.manifest.exists() {
        bail!("manifest not found: {}", layout.manifest.display());
    }

    println!("📦 Installing dependencies...");
    runner.sync(&layout.local_runtime, &layout.sync_args, &layout.app_dir)?;
    println!("✅ Dependencies installed");

    Ok(Outcome::Installed)
}
