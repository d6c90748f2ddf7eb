//! Zip extraction.
//!
//! Two shapes of archive are handled:
//! - a release archive from which exactly one named entry is pulled out
//! - a branch archive whose entries all live under one `reponame-branch/`
//!   folder; that folder is stripped so the tree lands directly in the
//!   destination

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::paths::with_suffix;

fn open(archive_path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive {}", archive_path.display()))?;
    ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip {}", archive_path.display()))
}

/// Extract the single entry `entry` to `dest` and mark it executable.
///
/// A missing entry is an error; nothing is written in that case.
pub fn extract_entry(archive_path: &Path, entry: &str, dest: &Path) -> Result<()> {
    let mut archive = open(archive_path)?;

    let mut file = match archive.by_name(entry) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => bail!(
            "entry '{}' not found in archive {}",
            entry,
            archive_path.display()
        ),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read entry '{}'", entry));
        }
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = with_suffix(dest, ".tmp");
    let copied = File::create(&tmp)
        .and_then(|mut out| io::copy(&mut file, &mut out).map(|_| ()))
        .with_context(|| format!("Failed to write {}", tmp.display()));
    if let Err(e) = copied {
        fs::remove_file(&tmp).ok();
        return Err(e);
    }

    make_executable(&tmp)?;
    fs::rename(&tmp, dest)
        .with_context(|| format!("Failed to move {} into place", dest.display()))?;
    Ok(())
}

/// First path segment shared by every entry, if there is exactly one
pub fn archive_root<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut root: Option<&str> = None;
    for name in names {
        // A top-level file means there is no synthetic root folder
        let (first, _) = name.split_once('/')?;
        match root {
            None => root = Some(first),
            Some(r) if r == first => {}
            Some(_) => return None,
        }
    }
    root.filter(|r| !r.is_empty()).map(str::to_string)
}

/// Remove the `root/` segment from an entry name.
///
/// Returns `None` for the bare root entry (nothing left to create).
/// Entries outside `root` are returned unchanged.
pub fn strip_root(name: &str, root: &str) -> Option<PathBuf> {
    let rest = match name.strip_prefix(root) {
        Some("") => return None,
        Some(r) if r.starts_with('/') => &r[1..],
        _ => name,
    };
    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return None;
    }
    Some(PathBuf::from(rest))
}

/// Only plain relative segments are allowed; rejects `..`, absolute paths, drive prefixes
fn is_contained(rel: &Path) -> bool {
    rel.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Extract every entry of `archive_path` under `dest`, stripping the shared root folder.
///
/// Returns the number of files written.
pub fn extract_stripped(archive_path: &Path, dest: &Path) -> Result<usize> {
    let mut archive = open(archive_path)?;
    let root = archive_root(archive.file_names()).unwrap_or_default();

    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read entry #{} of {}", i, archive_path.display()))?;

        if entry.enclosed_name().is_none() {
            bail!("unsafe path in archive: {}", entry.name());
        }
        let Some(rel) = strip_root(entry.name(), &root) else {
            continue;
        };
        if !is_contained(&rel) {
            bail!("unsafe path in archive: {}", entry.name());
        }

        let path = dest.join(&rel);

        if entry.is_dir() {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut out =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract {}", entry.name()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&path, fs::Permissions::from_mode(mode & 0o777))?;
            }
        }

        files += 1;
    }

    Ok(files)
}

/// Set mode 0755 on Unix; Windows decides executability by extension
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build a zip in memory. Names ending in `/` become directories.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    fn write_zip(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("test.zip");
        fs::write(&path, zip_bytes(entries)).unwrap();
        path
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(
            strip_root("root-branch/sub/file.txt", "root-branch"),
            Some(PathBuf::from("sub/file.txt"))
        );
        assert_eq!(strip_root("root-branch/", "root-branch"), None);
        assert_eq!(strip_root("root-branch", "root-branch"), None);
        assert_eq!(
            strip_root("root-branch/src/", "root-branch"),
            Some(PathBuf::from("src"))
        );
        // Names that merely share a prefix are not under the root
        assert_eq!(
            strip_root("root-branchx/a.txt", "root-branch"),
            Some(PathBuf::from("root-branchx/a.txt"))
        );
    }

    #[test]
    fn test_archive_root() {
        assert_eq!(
            archive_root(["pyv-master/", "pyv-master/src/Gui.py"]),
            Some("pyv-master".to_string())
        );
        assert_eq!(archive_root(["a/x", "b/y"]), None);
        assert_eq!(archive_root(["README.md", "a/x"]), None);
        assert_eq!(archive_root(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_extract_stripped() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(
            temp.path(),
            &[
                ("root-branch/", b""),
                ("root-branch/pyproject.toml", b"[project]\n"),
                ("root-branch/src/", b""),
                ("root-branch/src/Gui.py", b"print('hi')\n"),
                ("root-branch/sub/deep/file.txt", b"deep"),
            ],
        );
        let dest = temp.path().join("out");

        let files = extract_stripped(&archive, &dest).unwrap();

        assert_eq!(files, 3);
        assert_eq!(fs::read(dest.join("pyproject.toml")).unwrap(), b"[project]\n");
        assert_eq!(fs::read(dest.join("src/Gui.py")).unwrap(), b"print('hi')\n");
        assert_eq!(fs::read(dest.join("sub/deep/file.txt")).unwrap(), b"deep");
        assert!(!dest.join("root-branch").exists());
    }

    #[test]
    fn test_extract_rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(temp.path(), &[("../evil.txt", b"x")]);
        let dest = temp.path().join("out");

        assert!(extract_stripped(&archive, &dest).is_err());
        assert!(!temp.path().join("evil.txt").exists());
        assert!(!dest.join("evil.txt").exists());
    }

    #[test]
    fn test_extract_entry() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(
            temp.path(),
            &[("uv.exe", b"binary"), ("uvx.exe", b"other")],
        );
        let dest = temp.path().join("uv").join("uv.exe");

        extract_entry(&archive, "uv.exe", &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"binary");
        assert!(!temp.path().join("uv").join("uvx.exe").exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_extract_entry_missing() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(temp.path(), &[("README.md", b"nothing here")]);
        let dest = temp.path().join("uv").join("uv.exe");

        let err = extract_entry(&archive, "uv.exe", &dest).unwrap_err();

        assert!(err.to_string().contains("entry 'uv.exe' not found"));
        assert!(!dest.exists());
        assert!(!with_suffix(&dest, ".tmp").exists());
    }

    #[test]
    fn test_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.zip");
        fs::write(&path, b"<html>rate limited</html>").unwrap();

        let err = extract_stripped(&path, &temp.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("Failed to read zip"));
    }
}
