//! Volume variants and the type registry that builds them.
//!
//! | type       | files                          | vid          |
//! |------------|--------------------------------|--------------|
//! | read-write | `<name>.img`                   | the image    |
//! | read-only  | existing file given as vid     | the vid      |
//! | origin     | `<name>.img` + `<name>-cow.img` | origin image |
//! | snapshot   | template's origin pair         | origin image |
//! | volatile   | `volatile.img`                 | the image    |

use blkpool_core::layout::{COW_SUFFIX, IMAGE_SUFFIX, VOLATILE_IMAGE};
use blkpool_core::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::usage::disk_usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeType {
    ReadWrite,
    ReadOnly,
    Origin,
    Snapshot,
    Volatile,
}

impl VolumeType {
    pub const ALL: [VolumeType; 5] = [
        VolumeType::ReadWrite,
        VolumeType::ReadOnly,
        VolumeType::Origin,
        VolumeType::Snapshot,
        VolumeType::Volatile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeType::ReadWrite => "read-write",
            VolumeType::ReadOnly => "read-only",
            VolumeType::Origin => "origin",
            VolumeType::Snapshot => "snapshot",
            VolumeType::Volatile => "volatile",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| PoolError::UnknownType(tag.to_string()))
    }

    pub fn is_resizable(&self) -> bool {
        matches!(
            self,
            VolumeType::ReadWrite | VolumeType::Origin | VolumeType::Volatile
        )
    }

    /// Snapshot and read-only volumes live with their template's origin and
    /// take their size from the template.
    pub fn derives_from_template(&self) -> bool {
        matches!(self, VolumeType::Snapshot | VolumeType::ReadOnly)
    }

    /// Build a volume of this type, checking the type's invariants.
    pub fn construct(self, params: VolumeParams) -> Result<Volume> {
        if params.target_dir.as_os_str().is_empty() {
            return Err(PoolError::ConfigurationInvalid(format!(
                "target_dir not specified for volume {}",
                params.name
            )));
        }

        let volume = match self {
            VolumeType::ReadWrite => Volume::ReadWrite(ReadWriteFile::new(params)?),
            VolumeType::ReadOnly => Volume::ReadOnly(ReadOnlyFile::new(params)?),
            VolumeType::Origin => Volume::Origin(OriginFile::new(params)?),
            VolumeType::Snapshot => Volume::Snapshot(SnapshotFile::new(params)?),
            VolumeType::Volatile => Volume::Volatile(VolatileFile::new(params)?),
        };
        Ok(volume)
    }
}

impl FromStr for VolumeType {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

impl fmt::Display for VolumeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a variant constructor needs, after the pool resolved the
/// target directory and size.
#[derive(Debug, Clone)]
pub struct VolumeParams {
    pub name: String,
    pub pool: String,
    pub vid: Option<String>,
    pub size: u64,
    pub target_dir: PathBuf,
}

/// Fails unless `size` is positive.
pub fn require_positive_size(name: &str, size: u64) -> Result<u64> {
    if size == 0 {
        return Err(PoolError::ConfigurationInvalid(format!(
            "Size for volume {name} is <=0"
        )));
    }
    Ok(size)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VolumeBase {
    name: String,
    pool: String,
    size: u64,
    target_dir: PathBuf,
}

impl VolumeBase {
    fn from_params(params: &VolumeParams) -> Self {
        Self {
            name: params.name.clone(),
            pool: params.pool.clone(),
            size: params.size,
            target_dir: params.target_dir.clone(),
        }
    }

    fn image_path(&self) -> PathBuf {
        self.target_dir.join(format!("{}{}", self.name, IMAGE_SUFFIX))
    }

    fn cow_path(&self) -> PathBuf {
        self.target_dir.join(format!("{}{}", self.name, COW_SUFFIX))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWriteFile {
    base: VolumeBase,
    path: PathBuf,
}

impl ReadWriteFile {
    fn new(params: VolumeParams) -> Result<Self> {
        require_positive_size(&params.name, params.size)?;
        let base = VolumeBase::from_params(&params);
        let path = base.image_path();
        Ok(Self { base, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A pre-existing image used as is. Never created, resized or accounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyFile {
    base: VolumeBase,
    path: PathBuf,
}

impl ReadOnlyFile {
    fn new(params: VolumeParams) -> Result<Self> {
        let vid = params.vid.as_deref().ok_or_else(|| {
            PoolError::ConfigurationInvalid(format!("read-only volume {} missing vid", params.name))
        })?;
        let path = PathBuf::from(vid);
        if !path.exists() {
            return Err(PoolError::MissingImage(path));
        }
        Ok(Self {
            base: VolumeBase::from_params(&params),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Template image with its copy-on-write overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginFile {
    base: VolumeBase,
    path_origin: PathBuf,
    path_cow: PathBuf,
}

impl OriginFile {
    fn new(params: VolumeParams) -> Result<Self> {
        require_positive_size(&params.name, params.size)?;
        let base = VolumeBase::from_params(&params);
        Ok(Self {
            path_origin: base.image_path(),
            path_cow: base.cow_path(),
            base,
        })
    }

    pub fn path_origin(&self) -> &Path {
        &self.path_origin
    }

    pub fn path_cow(&self) -> &Path {
        &self.path_cow
    }
}

/// Read-only view of a template's origin pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    base: VolumeBase,
    path_origin: PathBuf,
    path_cow: PathBuf,
}

impl SnapshotFile {
    fn new(params: VolumeParams) -> Result<Self> {
        require_positive_size(&params.name, params.size)?;
        let base = VolumeBase::from_params(&params);
        Ok(Self {
            path_origin: base.image_path(),
            path_cow: base.cow_path(),
            base,
        })
    }

    pub fn path_origin(&self) -> &Path {
        &self.path_origin
    }

    pub fn path_cow(&self) -> &Path {
        &self.path_cow
    }

    /// Both halves of the template's pair are on disk.
    pub fn is_created(&self) -> bool {
        self.path_origin.exists() && self.path_cow.exists()
    }
}

/// Scratch image, wiped on every start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolatileFile {
    base: VolumeBase,
    path: PathBuf,
}

impl VolatileFile {
    fn new(params: VolumeParams) -> Result<Self> {
        require_positive_size(&params.name, params.size)?;
        let base = VolumeBase::from_params(&params);
        let path = base.target_dir.join(VOLATILE_IMAGE);
        Ok(Self { base, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Volume {
    ReadWrite(ReadWriteFile),
    ReadOnly(ReadOnlyFile),
    Origin(OriginFile),
    Snapshot(SnapshotFile),
    Volatile(VolatileFile),
}

impl Volume {
    fn base(&self) -> &VolumeBase {
        match self {
            Volume::ReadWrite(v) => &v.base,
            Volume::ReadOnly(v) => &v.base,
            Volume::Origin(v) => &v.base,
            Volume::Snapshot(v) => &v.base,
            Volume::Volatile(v) => &v.base,
        }
    }

    pub fn volume_type(&self) -> VolumeType {
        match self {
            Volume::ReadWrite(_) => VolumeType::ReadWrite,
            Volume::ReadOnly(_) => VolumeType::ReadOnly,
            Volume::Origin(_) => VolumeType::Origin,
            Volume::Snapshot(_) => VolumeType::Snapshot,
            Volume::Volatile(_) => VolumeType::Volatile,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn pool(&self) -> &str {
        &self.base().pool
    }

    pub fn size(&self) -> u64 {
        self.base().size
    }

    pub fn target_dir(&self) -> &Path {
        &self.base().target_dir
    }

    /// External identity: the single image, or the origin half of a pair.
    pub fn vid(&self) -> &Path {
        match self {
            Volume::ReadWrite(v) => &v.path,
            Volume::ReadOnly(v) => &v.path,
            Volume::Origin(v) => &v.path_origin,
            Volume::Snapshot(v) => &v.path_origin,
            Volume::Volatile(v) => &v.path,
        }
    }

    /// Path as handed to the hypervisor; pairs are written `origin:cow`.
    pub fn path(&self) -> String {
        match self {
            Volume::Origin(OriginFile {
                path_origin,
                path_cow,
                ..
            })
            | Volume::Snapshot(SnapshotFile {
                path_origin,
                path_cow,
                ..
            }) => format!("{}:{}", path_origin.display(), path_cow.display()),
            _ => self.vid().display().to_string(),
        }
    }

    /// Every file that must exist for the volume to be usable.
    pub fn image_paths(&self) -> Vec<&Path> {
        match self {
            Volume::Origin(v) => vec![v.path_origin.as_path(), v.path_cow.as_path()],
            Volume::Snapshot(v) => vec![v.path_origin.as_path(), v.path_cow.as_path()],
            _ => vec![self.vid()],
        }
    }

    pub fn is_created(&self) -> bool {
        match self {
            Volume::Snapshot(v) => v.is_created(),
            _ => self.image_paths().iter().all(|p| p.exists()),
        }
    }

    pub fn is_rw(&self) -> bool {
        !matches!(self, Volume::ReadOnly(_) | Volume::Snapshot(_))
    }

    /// Space actually allocated on disk.
    pub fn usage(&self) -> u64 {
        match self {
            Volume::ReadWrite(v) => disk_usage(&v.path),
            Volume::Volatile(v) => disk_usage(&v.path),
            Volume::Origin(v) => disk_usage(&v.path_origin) + disk_usage(&v.path_cow),
            Volume::ReadOnly(_) | Volume::Snapshot(_) => 0,
        }
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        let base = match self {
            Volume::ReadWrite(v) => &mut v.base,
            Volume::ReadOnly(v) => &mut v.base,
            Volume::Origin(v) => &mut v.base,
            Volume::Snapshot(v) => &mut v.base,
            Volume::Volatile(v) => &mut v.base,
        };
        base.size = size;
    }

    pub fn info(&self) -> VolumeInfo {
        VolumeInfo {
            name: self.name().to_string(),
            pool: self.pool().to_string(),
            volume_type: self.volume_type(),
            vid: self.vid().to_path_buf(),
            path: self.path(),
            size: self.size(),
            usage: self.usage(),
            rw: self.is_rw(),
            created: self.is_created(),
        }
    }
}

/// Point-in-time summary of a volume, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub pool: String,
    pub volume_type: VolumeType,
    pub vid: PathBuf,
    pub path: String,
    pub size: u64,
    pub usage: u64,
    pub rw: bool,
    pub created: bool,
}
