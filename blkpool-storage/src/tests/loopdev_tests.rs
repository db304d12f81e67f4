use crate::loopdev::{LoopControl, LoopDevice, parse_associated, refresh_capacity};
use blkpool_core::{PoolError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingLoop {
    device: Option<LoopDevice>,
    fail_set_capacity: bool,
    queried: Mutex<Vec<PathBuf>>,
    refreshed: Mutex<Vec<LoopDevice>>,
}

impl LoopControl for RecordingLoop {
    fn find_device(&self, path: &Path) -> Result<Option<LoopDevice>> {
        self.queried.lock().unwrap().push(path.to_path_buf());
        Ok(self.device.clone())
    }

    fn set_capacity(&self, device: &LoopDevice) -> Result<()> {
        if self.fail_set_capacity {
            return Err(PoolError::CommandFailed {
                command: format!("losetup --set-capacity {device}"),
                cause: "exit status: 1".to_string(),
            });
        }
        self.refreshed.lock().unwrap().push(device.clone());
        Ok(())
    }
}

#[test]
fn test_parse_associated_device() {
    let output = "/dev/loop3: [2049]:1234 (/var/lib/pool/appvms/work/private.img)\n";
    assert_eq!(parse_associated(output), Some(LoopDevice::new("/dev/loop3")));
}

#[test]
fn test_parse_associated_takes_first_device() {
    let output = "/dev/loop12: [64768]:55 (/pool/a.img)\n/dev/loop13: [64768]:55 (/pool/a.img)\n";
    assert_eq!(parse_associated(output), Some(LoopDevice::new("/dev/loop12")));
}

#[test]
fn test_parse_associated_no_device() {
    assert_eq!(parse_associated(""), None);
    assert_eq!(parse_associated("/dev/loopX: [1]:2 (/a.img)"), None);
    assert_eq!(parse_associated("/dev/loop: [1]:2 (/a.img)"), None);
    assert_eq!(parse_associated("/dev/sda1: [1]:2 (/a.img)"), None);
    assert_eq!(parse_associated("/dev/loop4:missing-space"), None);
}

#[test]
fn test_refresh_without_device() -> Result<()> {
    let control = RecordingLoop::default();
    let device = refresh_capacity(&control, Path::new("/pool/appvms/work/private.img"))?;

    assert_eq!(device, None);
    assert_eq!(control.queried.lock().unwrap().len(), 1);
    assert!(control.refreshed.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_refresh_with_device() -> Result<()> {
    let control = RecordingLoop {
        device: Some(LoopDevice::new("/dev/loop7")),
        ..Default::default()
    };
    let device = refresh_capacity(&control, Path::new("/pool/appvms/work/private.img"))?;

    assert_eq!(device, Some(LoopDevice::new("/dev/loop7")));
    assert_eq!(
        *control.refreshed.lock().unwrap(),
        vec![LoopDevice::new("/dev/loop7")]
    );
    Ok(())
}

#[test]
fn test_refresh_failure_propagates() {
    let control = RecordingLoop {
        device: Some(LoopDevice::new("/dev/loop7")),
        fail_set_capacity: true,
        ..Default::default()
    };
    let err = refresh_capacity(&control, Path::new("/pool/a.img")).unwrap_err();
    assert!(matches!(err, PoolError::CommandFailed { .. }));
}
