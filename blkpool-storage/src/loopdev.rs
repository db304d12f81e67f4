//! Loop devices backed by pool images.
//!
//! A running VM may see its image through a loop device; after the image
//! grows, the device has to be told to re-read its capacity.

use blkpool_core::{PoolError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopDevice(String);

impl LoopDevice {
    pub fn new(device: impl Into<String>) -> Self {
        Self(device.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoopDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait LoopControl: Send + Sync {
    /// The loop device currently backed by `path`, if any.
    fn find_device(&self, path: &Path) -> Result<Option<LoopDevice>>;

    /// Make `device` pick up the new size of its backing file.
    fn set_capacity(&self, device: &LoopDevice) -> Result<()>;
}

/// Grow the loop device attached to `path`, if there is one.
///
/// The lookup and the capacity update are separate calls; nothing stops
/// another process from detaching the device in between.
pub fn refresh_capacity(control: &dyn LoopControl, path: &Path) -> Result<Option<LoopDevice>> {
    let device = control.find_device(path)?;
    if let Some(device) = &device {
        info!("Refreshing capacity of {} for {}", device, path.display());
        control.set_capacity(device)?;
    }
    Ok(device)
}

/// Pick the device out of `losetup --associated` output, e.g.
/// `/dev/loop3: [2049]:1234 (/var/lib/pool/appvms/work/private.img)`.
pub fn parse_associated(output: &str) -> Option<LoopDevice> {
    output.lines().find_map(|line| {
        let (device, rest) = line.split_once(':')?;
        let number = device.strip_prefix("/dev/loop")?;
        let is_loop = !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit());
        let followed_by_space = rest.starts_with(char::is_whitespace);
        (is_loop && followed_by_space).then(|| LoopDevice::new(device))
    })
}

/// [`LoopControl`] on top of util-linux `losetup`.
pub struct Losetup {
    losetup_path: PathBuf,
    use_sudo: bool,
}

impl Losetup {
    pub fn new(losetup_path: PathBuf, use_sudo: bool) -> Self {
        Self {
            losetup_path,
            use_sudo,
        }
    }

    /// Use the `losetup` found on PATH.
    pub fn locate(use_sudo: bool) -> Self {
        let losetup_path =
            which::which("losetup").unwrap_or_else(|_| PathBuf::from("/sbin/losetup"));
        Self::new(losetup_path, use_sudo)
    }

    fn command(&self) -> Command {
        if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.losetup_path);
            cmd
        } else {
            Command::new(&self.losetup_path)
        }
    }

    fn run(&self, mut cmd: Command) -> Result<String> {
        debug!("Running {:?}", cmd);
        let output = cmd
            .output()
            .map_err(|e| PoolError::command_failed(&cmd, e))?;

        if !output.status.success() {
            return Err(PoolError::command_failed(
                &cmd,
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl LoopControl for Losetup {
    fn find_device(&self, path: &Path) -> Result<Option<LoopDevice>> {
        let mut cmd = self.command();
        cmd.arg("--associated").arg(path);
        let stdout = self.run(cmd)?;
        Ok(parse_associated(&stdout))
    }

    fn set_capacity(&self, device: &LoopDevice) -> Result<()> {
        let mut cmd = self.command();
        cmd.arg("--set-capacity").arg(device.as_str());
        self.run(cmd)?;
        Ok(())
    }
}
