//! Download infrastructure.
//!
//! - reqwest blocking client, one GET per artifact, no retries
//! - body streamed into `<dest>.part`, renamed once complete

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::paths::with_suffix;

/// Fetches a URL into a local file
pub trait Downloader {
    /// Download `url` to `dest`, returning the number of bytes written.
    ///
    /// `dest` either ends up complete or does not exist.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Real downloader backed by `reqwest::blocking`
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        // No overall timeout: release archives can take a while on slow links
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to GET {}", url))?;

        // Anything but 200 (204, 206, ...) would leave a truncated archive in place
        if response.status() != reqwest::StatusCode::OK {
            bail!("HTTP {}: {}", response.status(), url);
        }

        let total_size = response.content_length();
        write_streamed(response, dest, total_size)
    }
}

/// Stream `body` into `<dest>.part` and rename it to `dest`
pub fn write_streamed(mut body: impl Read, dest: &Path, total_size: Option<u64>) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part = with_suffix(dest, ".part");
    let mut file =
        File::create(&part).with_context(|| format!("Failed to create {}", part.display()))?;

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 8192];
    let result = (|| -> Result<()> {
        loop {
            let bytes_read = body.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;

            // Simple progress
            if let Some(total) = total_size {
                print!("\r  {}/{} KB", downloaded / 1024, total / 1024);
            } else {
                print!("\r  {} KB", downloaded / 1024);
            }
            std::io::stdout().flush().ok();
        }
        file.sync_all()?;
        Ok(())
    })();
    println!();
    drop(file);

    if let Err(e) = result {
        fs::remove_file(&part).ok();
        return Err(e.context(format!("Failed to save {}", dest.display())));
    }

    fs::rename(&part, dest)
        .with_context(|| format!("Failed to move {} into place", part.display()))?;

    Ok(downloaded)
}
