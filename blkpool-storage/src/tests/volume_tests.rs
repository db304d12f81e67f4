use crate::volume::{Volume, VolumeParams, VolumeType};
use blkpool_core::{PoolError, Result};
use std::path::PathBuf;
use tempfile::TempDir;

fn params(name: &str, size: u64, target_dir: &str) -> VolumeParams {
    VolumeParams {
        name: name.to_string(),
        pool: "default".to_string(),
        vid: None,
        size,
        target_dir: PathBuf::from(target_dir),
    }
}

#[test]
fn test_known_type_tags() -> Result<()> {
    for tag in ["read-write", "read-only", "origin", "snapshot", "volatile"] {
        let volume_type = VolumeType::from_tag(tag)?;
        assert_eq!(volume_type.as_str(), tag);
        assert_eq!(tag.parse::<VolumeType>()?, volume_type);
    }
    Ok(())
}

#[test]
fn test_unknown_type_tag() {
    let err = VolumeType::from_tag("thin-pool").unwrap_err();
    assert!(matches!(err, PoolError::UnknownType(ref tag) if tag == "thin-pool"));
}

#[test]
fn test_zero_size_rejected_for_sized_types() {
    for volume_type in [
        VolumeType::ReadWrite,
        VolumeType::Origin,
        VolumeType::Volatile,
        VolumeType::Snapshot,
    ] {
        let err = volume_type
            .construct(params("private", 0, "/pool/appvms/work"))
            .unwrap_err();
        assert!(
            matches!(err, PoolError::ConfigurationInvalid(_)),
            "{volume_type} accepted size 0"
        );
    }
}

#[test]
fn test_empty_target_dir_rejected() {
    let err = VolumeType::ReadWrite
        .construct(params("private", 1024, ""))
        .unwrap_err();
    assert!(matches!(err, PoolError::ConfigurationInvalid(_)));
}

#[test]
fn test_read_write_paths() -> Result<()> {
    let volume = VolumeType::ReadWrite.construct(params("private", 1024, "/pool/appvms/work"))?;
    assert_eq!(volume.vid(), PathBuf::from("/pool/appvms/work/private.img"));
    assert_eq!(volume.path(), "/pool/appvms/work/private.img");
    assert_eq!(volume.size(), 1024);
    assert!(volume.is_rw());
    Ok(())
}

#[test]
fn test_origin_paths() -> Result<()> {
    let volume = VolumeType::Origin.construct(params("root", 4096, "/pool/vm-templates/fedora"))?;
    let Volume::Origin(origin) = &volume else {
        panic!("expected origin volume");
    };
    assert_eq!(
        origin.path_cow(),
        PathBuf::from("/pool/vm-templates/fedora/root-cow.img")
    );
    assert_eq!(volume.vid(), PathBuf::from("/pool/vm-templates/fedora/root.img"));
    assert_eq!(
        volume.path(),
        "/pool/vm-templates/fedora/root.img:/pool/vm-templates/fedora/root-cow.img"
    );
    assert_eq!(volume.image_paths().len(), 2);
    Ok(())
}

#[test]
fn test_volatile_uses_fixed_name() -> Result<()> {
    let volume = VolumeType::Volatile.construct(params("volatile", 512, "/pool/appvms/work"))?;
    assert_eq!(volume.vid(), PathBuf::from("/pool/appvms/work/volatile.img"));
    Ok(())
}

#[test]
fn test_read_only_requires_existing_vid() -> Result<()> {
    let err = VolumeType::ReadOnly
        .construct(params("kernel", 0, "/pool/vm-templates/fedora"))
        .unwrap_err();
    assert!(matches!(err, PoolError::ConfigurationInvalid(_)));

    let mut missing = params("kernel", 0, "/pool/vm-templates/fedora");
    missing.vid = Some("/nonexistent/blkpool/kernel.img".to_string());
    let err = VolumeType::ReadOnly.construct(missing).unwrap_err();
    assert!(matches!(err, PoolError::MissingImage(_)));

    let dir = TempDir::new()?;
    let image = dir.path().join("kernel.img");
    std::fs::write(&image, b"vmlinuz")?;

    let mut existing = params("kernel", 0, "/pool/vm-templates/fedora");
    existing.vid = Some(image.display().to_string());
    let volume = VolumeType::ReadOnly.construct(existing)?;
    assert_eq!(volume.vid(), image);
    assert_eq!(volume.usage(), 0);
    assert!(!volume.is_rw());
    Ok(())
}

#[test]
fn test_snapshot_created_only_with_both_files() -> Result<()> {
    let dir = TempDir::new()?;
    let mut p = params("root", 4096, "unused");
    p.target_dir = dir.path().to_path_buf();
    let volume = VolumeType::Snapshot.construct(p)?;

    assert!(!volume.is_created());
    std::fs::write(dir.path().join("root.img"), b"")?;
    assert!(!volume.is_created());
    std::fs::write(dir.path().join("root-cow.img"), b"")?;
    assert!(volume.is_created());
    assert_eq!(volume.usage(), 0);
    Ok(())
}

#[test]
fn test_resizable_types() {
    let resizable: Vec<_> = VolumeType::ALL
        .into_iter()
        .filter(|t| t.is_resizable())
        .collect();
    assert_eq!(
        resizable,
        vec![
            VolumeType::ReadWrite,
            VolumeType::Origin,
            VolumeType::Volatile
        ]
    );
}
