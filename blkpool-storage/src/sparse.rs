//! Sparse image files.
//!
//! Images are never written to here, only created and truncated, so the
//! filesystem allocates no blocks until the guest writes.

use blkpool_core::{PoolError, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Mode for images the hypervisor must be able to write (umask 002).
#[cfg(unix)]
const SHARED_IMAGE_MODE: u32 = 0o664;

/// Create an empty sparse file of `size` bytes, creating parent directories.
pub fn create_sparse_file(path: &Path, size: u64) -> Result<()> {
    if path.exists() {
        return Err(PoolError::AlreadyExists(path.to_path_buf()));
    }
    ensure_parent_dir(path)?;
    truncate_file(path, size)?;
    debug!("Created sparse file {} ({} bytes)", path.display(), size);
    Ok(())
}

/// Set the logical size of `path`, creating the file if needed.
pub fn truncate_file(path: &Path, size: u64) -> Result<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    file.set_len(size)?;
    Ok(())
}

/// Remove `path` if present and create it again empty at `size` bytes.
pub fn recreate_sparse_file(path: &Path, size: u64) -> Result<()> {
    remove_if_exists(path)?;
    create_sparse_file(path, size)
}

/// Create a fresh sparse file that group members may write, whatever the
/// process umask is. An existing file is truncated to zero first.
pub fn create_shared_sparse_file(path: &Path, size: u64) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SHARED_IMAGE_MODE);
    }

    let file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(SHARED_IMAGE_MODE))?;
    }

    file.set_len(size)?;
    debug!("Created shared sparse file {} ({} bytes)", path.display(), size);
    Ok(())
}

pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Create `path` if it does not exist. Parents are not created.
pub fn create_dir_if_missing(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => {
            debug!("Created directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
