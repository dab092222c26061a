//! Writing generated images to disk

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

/// Writes `bytes` to `path`, replacing any existing file.
///
/// The parent directory must already exist. If writing fails part way, the incomplete file is
/// removed.
///
/// # Errors
/// Returns [`WriteError`] if the file cannot be created or written.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let error = |source| WriteError {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(error)?;
    let mut partial = PartialFile {
        path,
        file: Some(file),
        committed: false,
    };
    partial.write_all(bytes).map_err(error)?;
    partial.committed = true;
    info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Removes the file on drop unless it was completely written
struct PartialFile<'a> {
    path: &'a Path,
    file: Option<File>,
    committed: bool,
}

impl PartialFile<'_> {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let Some(file) = &mut self.file else {
            return Ok(());
        };
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        drop(self.file.take());
        if self.committed {
            return;
        }
        // only regular files, never devices such as /dev/full
        let is_file = fs::symlink_metadata(self.path).is_ok_and(|metadata| metadata.is_file());
        if is_file && fs::remove_file(self.path).is_ok() {
            debug!("removed incomplete file {}", self.path.display());
        }
    }
}

/// An image that could not be written
#[derive(Debug, Error)]
#[error("failed to write {}", .path.display())]
pub struct WriteError {
    /// The output file
    pub path: PathBuf,
    /// The underlying error
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::ErrorKind;

    use tempfile::tempdir;

    use super::write_image;

    #[test]
    fn writes_bytes() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("out.png");
        write_image(&path, b"image").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"image");
    }

    #[test]
    fn replaces_existing_file() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("out.png");
        fs::write(&path, b"a much longer previous image").expect("write");
        write_image(&path, b"new").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn missing_parent_directory() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("missing").join("out.png");
        let error = write_image(&path, b"image").unwrap_err();
        assert_eq!(error.path, path);
        assert_eq!(error.source.kind(), ErrorKind::NotFound);
        assert!(error.to_string().contains("out.png"));
        assert!(!tmp.path().join("missing").exists());
    }

    #[test]
    fn directory_is_not_a_file() {
        let tmp = tempdir().expect("tempdir");
        assert!(write_image(tmp.path(), b"image").is_err());
        assert!(tmp.path().is_dir());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_leaves_device_alone() {
        let path = std::path::Path::new("/dev/full");
        if !path.exists() {
            return;
        }
        let error = write_image(path, b"image").unwrap_err();
        assert_eq!(error.path, path);
        assert!(path.exists());
    }
}
