//! Upload intake: an owning guard for the temporary uploaded file.
//!
//! The uploaded file is the only resource the pipeline owns, and it must be
//! released exactly once on every exit path — success, tolerated partial
//! failure, fatal error, or a panic before extraction even ran. Rather than
//! sprinkling cleanup calls across those paths, [`TempUpload`] owns the path
//! and deletes the file in `Drop`; moving the guard into the pipeline is the
//! acquire, and the guard going out of scope is the release.
//!
//! A missing file at release time is not an error (the transport layer may
//! have its own cleanup); any other deletion failure is logged and swallowed,
//! since by then the draft is already decided.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owning handle for a temporary uploaded file.
///
/// Construct with [`TempUpload::claim`] for a file the transport layer
/// already wrote to disk, or [`TempUpload::from_bytes`] to spool an
/// in-memory upload. The file is deleted when the guard drops.
pub struct TempUpload {
    path: PathBuf,
    original_name: String,
    released: bool,
}

impl TempUpload {
    /// Take ownership of an uploaded file already on disk.
    ///
    /// `original_name` is the filename the user gave the upload; the on-disk
    /// name is typically a generated temp name.
    pub fn claim(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            released: false,
        }
    }

    /// Spool `bytes` to a fresh temp file and claim it.
    pub fn from_bytes(bytes: &[u8], original_name: &str) -> std::io::Result<Self> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(bytes)?;
        let (_file, path) = file.keep().map_err(|e| e.error)?;
        Ok(Self::claim(path, original_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "released temp upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to release temp upload"
            ),
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_writes_and_drop_deletes() {
        let upload = TempUpload::from_bytes(b"some content", "notes.txt").expect("spool");
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(upload.original_name(), "notes.txt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "some content");

        drop(upload);
        assert!(!path.exists(), "temp file must be deleted on drop");
    }

    #[test]
    fn claimed_file_is_deleted_on_drop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("upload-0001");
        std::fs::write(&path, "payload").unwrap();

        let upload = TempUpload::claim(&path, "report.md");
        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn dropping_a_guard_for_a_missing_file_is_silent() {
        let upload = TempUpload::claim("/tmp/docdraft-definitely-gone-12345", "gone.txt");
        drop(upload); // must not panic
    }
}
