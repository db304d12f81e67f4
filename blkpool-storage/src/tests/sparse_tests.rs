use crate::sparse::{
    create_dir_if_missing, create_shared_sparse_file, create_sparse_file, recreate_sparse_file,
    remove_if_exists, truncate_file,
};
use blkpool_core::{PoolError, Result};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_create_sparse_file_makes_parents() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("appvms/work/private.img");

    create_sparse_file(&path, 1024 * 1024)?;
    assert_eq!(fs::metadata(&path)?.len(), 1024 * 1024);
    Ok(())
}

#[test]
fn test_create_sparse_file_refuses_existing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("private.img");
    fs::write(&path, b"data")?;

    let err = create_sparse_file(&path, 4096).unwrap_err();
    assert!(matches!(err, PoolError::AlreadyExists(ref p) if *p == path));
    assert_eq!(fs::read(&path)?, b"data");
    Ok(())
}

#[test]
fn test_truncate_grows_and_keeps_content() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("private.img");
    fs::write(&path, b"header")?;

    truncate_file(&path, 8192)?;
    let content = fs::read(&path)?;
    assert_eq!(content.len(), 8192);
    assert_eq!(&content[..6], b"header");
    Ok(())
}

#[test]
fn test_recreate_discards_content() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("volatile.img");
    fs::write(&path, vec![0xffu8; 4096])?;

    recreate_sparse_file(&path, 2048)?;
    let content = fs::read(&path)?;
    assert_eq!(content.len(), 2048);
    assert!(content.iter().all(|b| *b == 0));
    Ok(())
}

#[test]
fn test_remove_if_exists_tolerates_missing() -> Result<()> {
    let dir = TempDir::new()?;
    remove_if_exists(&dir.path().join("missing.img"))?;
    Ok(())
}

#[test]
fn test_create_dir_if_missing_is_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("appvms");

    create_dir_if_missing(&path)?;
    create_dir_if_missing(&path)?;
    assert!(path.is_dir());

    // Parents are not created.
    assert!(create_dir_if_missing(&dir.path().join("a/b")).is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_shared_sparse_file_is_group_writable() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new()?;
    let path = dir.path().join("root-cow.img");
    create_shared_sparse_file(&path, 4096)?;

    let metadata = fs::metadata(&path)?;
    assert_eq!(metadata.len(), 4096);
    assert_eq!(metadata.permissions().mode() & 0o777, 0o664);
    Ok(())
}
