//! Application fetcher - downloads the branch archive and unpacks the source tree
//!
//! The tree is unpacked into `<appdir>.partial/` and renamed into place only
//! after every entry was written, so an existing app directory is always a
//! complete one.

use anyhow::{Context, Result};
use std::fs;

use crate::archive;
use crate::download::Downloader;
use crate::paths::{with_suffix, Layout};
use crate::pipeline::Outcome;

/// Ensure the application directory exists
pub fn ensure(layout: &Layout, downloader: &dyn Downloader) -> Result<Outcome> {
    if layout.app_dir.exists() {
        println!(
            "✓ {} already installed, skipping download",
            layout.app_dir.display()
        );
        return Ok(Outcome::Present);
    }

    if layout.app_archive.exists() {
        println!("✓ {} already downloaded", layout.app_archive.display());
    } else {
        println!("📥 Downloading {}...", layout.app_url);
        let bytes = downloader.download(&layout.app_url, &layout.app_archive)?;
        println!("✅ Downloaded {} ({} KB)", layout.app_archive.display(), bytes / 1024);
    }

    let staging = with_suffix(&layout.app_dir, ".partial");
    if staging.exists() {
        // Left behind by an interrupted run
        fs::remove_dir_all(&staging)
            .with_context(|| format!("Failed to clear {}", staging.display()))?;
    }

    println!(
        "📦 Extracting {} into {}...",
        layout.app_archive.display(),
        layout.app_dir.display()
    );
    let files = archive::extract_stripped(&layout.app_archive, &staging)?;

    fs::rename(&staging, &layout.app_dir)
        .with_context(|| format!("Failed to move {} into place", layout.app_dir.display()))?;
    println!("✅ Extracted {} files", files);

    Ok(Outcome::Installed)
}
