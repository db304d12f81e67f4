//! Real disk usage of sparse images.
//!
//! Logical file sizes say nothing about how much a sparse image occupies,
//! so usage is computed from allocated block counts.

use std::fs::Metadata;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Unit of `st_blocks`, independent of the filesystem block size.
pub const BLOCK_SIZE: u64 = 512;

/// Disk usage of a single inode.
///
/// Falls back to the logical size where the platform has no block count.
pub fn inode_usage(metadata: &Metadata) -> u64 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        metadata.blocks() * BLOCK_SIZE
    }

    #[cfg(not(unix))]
    {
        metadata.len()
    }
}

/// Disk usage of `path`, recursing into directories without following links.
///
/// A path that does not exist uses nothing.
pub fn disk_usage(path: &Path) -> u64 {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return 0,
    };

    let mut total = inode_usage(&metadata);
    if !metadata.is_dir() {
        return total;
    }

    for entry in WalkDir::new(path).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", path.display(), e);
                continue;
            }
        };
        match entry.metadata() {
            Ok(metadata) => total += inode_usage(&metadata),
            Err(e) => debug!("Cannot stat {}: {}", entry.path().display(), e),
        }
    }

    total
}
