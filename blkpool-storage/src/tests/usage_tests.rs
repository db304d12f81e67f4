use crate::usage::{disk_usage, inode_usage};
use blkpool_core::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn expected_usage(path: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path)?;
    let mut total = inode_usage(&metadata);
    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            total += expected_usage(&entry?.path())?;
        }
    }
    Ok(total)
}

#[test]
fn test_missing_path_uses_nothing() {
    assert_eq!(disk_usage(Path::new("/nonexistent/blkpool/usage.img")), 0);
}

#[test]
fn test_sparse_file_usage_below_logical_size() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("sparse.img");
    let file = fs::File::create(&path)?;
    file.set_len(64 * 1024 * 1024)?;

    assert_eq!(fs::metadata(&path)?.len(), 64 * 1024 * 1024);
    assert!(disk_usage(&path) <= 64 * 1024 * 1024);
    Ok(())
}

#[test]
fn test_written_file_is_accounted() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data.img");
    fs::write(&path, vec![0xa5u8; 64 * 1024])?;

    assert!(disk_usage(&path) >= 64 * 1024);
    Ok(())
}

#[test]
fn test_directory_usage_is_recursive_sum() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path().join("appvms");
    fs::create_dir_all(root.join("work"))?;
    fs::create_dir_all(root.join("personal/nested"))?;
    fs::write(root.join("work/private.img"), vec![1u8; 16 * 1024])?;
    fs::write(root.join("personal/private.img"), vec![2u8; 8 * 1024])?;
    fs::write(root.join("personal/nested/volatile.img"), vec![3u8; 4 * 1024])?;

    let total = disk_usage(&root);
    assert_eq!(total, expected_usage(&root)?);
    assert!(total >= disk_usage(&root.join("work/private.img")));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() -> Result<()> {
    let dir = TempDir::new()?;
    let outside = dir.path().join("outside.img");
    fs::write(&outside, vec![7u8; 128 * 1024])?;

    let root = dir.path().join("pool");
    fs::create_dir(&root)?;
    std::os::unix::fs::symlink(&outside, root.join("link.img"))?;

    assert_eq!(disk_usage(&root), expected_usage(&root)?);
    assert!(disk_usage(&root) < disk_usage(&outside));
    Ok(())
}
