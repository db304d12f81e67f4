//! Copying images, preferring copy-on-write block cloning.

use blkpool_core::{PoolError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::sparse::ensure_parent_dir;

/// Copies one image file to a new location.
///
/// Implementations only perform the copy; [`copy_file`] checks the paths
/// beforehand.
pub trait FileCloner: Send + Sync {
    fn clone_file(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// Copy `source` to `destination`, which must not exist yet.
pub fn copy_file(cloner: &dyn FileCloner, source: &Path, destination: &Path) -> Result<()> {
    if !source.exists() {
        return Err(PoolError::SourceMissing(source.to_path_buf()));
    }
    if destination.exists() {
        return Err(PoolError::AlreadyExists(destination.to_path_buf()));
    }
    ensure_parent_dir(destination)?;

    info!("Copying {} to {}", source.display(), destination.display());
    cloner.clone_file(source, destination)
}

/// Clones with `cp --reflink=auto`, which also keeps holes in sparse files.
pub struct CpCloner {
    cp_path: PathBuf,
}

impl CpCloner {
    pub fn new(cp_path: PathBuf) -> Self {
        Self { cp_path }
    }

    /// Use the `cp` found on PATH.
    pub fn locate() -> Self {
        let cp_path = which::which("cp").unwrap_or_else(|_| PathBuf::from("/bin/cp"));
        Self::new(cp_path)
    }
}

impl FileCloner for CpCloner {
    fn clone_file(&self, source: &Path, destination: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.cp_path);
        cmd.arg("--reflink=auto").arg(source).arg(destination);
        debug!("Running {:?}", cmd);

        let copy_failed = |cause: String| PoolError::CopyFailed {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            cause,
        };

        let output = cmd.output().map_err(|e| copy_failed(e.to_string()))?;
        if !output.status.success() {
            return Err(copy_failed(format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// In-process reflink, falling back to a plain copy where the filesystem
/// cannot share extents.
pub struct NativeCloner;

impl FileCloner for NativeCloner {
    fn clone_file(&self, source: &Path, destination: &Path) -> Result<()> {
        match reflink_copy::reflink_or_copy(source, destination) {
            Ok(None) => {
                debug!("Reflinked {}", destination.display());
                Ok(())
            }
            Ok(Some(copied)) => {
                debug!("Copied {} bytes to {}", copied, destination.display());
                Ok(())
            }
            Err(e) => Err(PoolError::CopyFailed {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                cause: e.to_string(),
            }),
        }
    }
}
