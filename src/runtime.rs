//! Runtime fetcher - makes sure the uv executable is unpacked under the launcher root

use anyhow::Result;

use crate::archive;
use crate::download::Downloader;
use crate::paths::Layout;
use crate::pipeline::Outcome;

/// Ensure the runtime executable exists, downloading and unpacking it if needed
pub fn ensure(layout: &Layout, downloader: &dyn Downloader) -> Result<Outcome> {
    if layout.runtime_exe.exists() {
        println!("✓ {} already installed", layout.runtime_entry);
        return Ok(Outcome::Present);
    }

    if layout.runtime_archive.exists() {
        println!(
            "✓ {} already downloaded, skipping download",
            layout.runtime_archive.display()
        );
    } else {
        println!("📥 Downloading {}...", layout.runtime_url);
        let bytes = downloader.download(&layout.runtime_url, &layout.runtime_archive)?;
        println!("✅ Downloaded {} ({} KB)", layout.runtime_archive.display(), bytes / 1024);
    }

    println!(
        "📦 Unpacking {} into {}...",
        layout.runtime_entry,
        layout.runtime_dir.display()
    );
    archive::extract_entry(
        &layout.runtime_archive,
        &layout.runtime_entry,
        &layout.runtime_exe,
    )?;
    println!("✅ {} unpacked", layout.runtime_exe.display());

    Ok(Outcome::Installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::config::Config;
    use crate::download::tests::FakeDownloader;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_install() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::resolve(temp.path(), &Config::default());
        let downloader = FakeDownloader::new()
            .serve(&layout.runtime_url, zip_bytes(&[("uv.exe", b"uv-binary")]));

        let outcome = ensure(&layout, &downloader).unwrap();

        assert_eq!(outcome, Outcome::Installed);
        assert_eq!(downloader.calls(), 1);
        assert_eq!(fs::read(&layout.runtime_exe).unwrap(), b"uv-binary");
        assert!(layout.runtime_archive.exists());
    }

    #[test]
    fn test_existing_executable_skips_everything() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::resolve(temp.path(), &Config::default());
        fs::create_dir_all(&layout.runtime_dir).unwrap();
        fs::write(&layout.runtime_exe, b"old").unwrap();
        let downloader = FakeDownloader::new();

        let outcome = ensure(&layout, &downloader).unwrap();

        assert_eq!(outcome, Outcome::Present);
        assert_eq!(downloader.calls(), 0);
        assert!(!layout.runtime_archive.exists());
    }

    #[test]
    fn test_existing_archive_skips_download() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::resolve(temp.path(), &Config::default());
        fs::write(&layout.runtime_archive, zip_bytes(&[("uv.exe", b"cached")])).unwrap();
        let downloader = FakeDownloader::new();

        let outcome = ensure(&layout, &downloader).unwrap();

        assert_eq!(outcome, Outcome::Installed);
        assert_eq!(downloader.calls(), 0);
        assert_eq!(fs::read(&layout.runtime_exe).unwrap(), b"cached");
    }

    #[test]
    fn test_archive_without_executable() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::resolve(temp.path(), &Config::default());
        fs::write(&layout.runtime_archive, zip_bytes(&[("uvx.exe", b"wrong")])).unwrap();

        let err = ensure(&layout, &FakeDownloader::new()).unwrap_err();

        assert!(err.to_string().contains("entry 'uv.exe' not found"));
        assert!(!layout.runtime_exe.exists());
    }

    #[test]
    fn test_download_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::resolve(temp.path(), &Config::default());
        let downloader = FakeDownloader::new();

        let err = ensure(&layout, &downloader).unwrap_err();

        assert!(err.to_string().contains("HTTP 404"));
        assert_eq!(downloader.calls(), 1);
        assert!(!layout.runtime_exe.exists());
    }
}
