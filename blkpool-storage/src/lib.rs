pub mod clone;
pub mod loopdev;
pub mod pool;
pub mod registry;
pub mod sparse;
pub mod usage;
pub mod volume;

#[cfg(test)]
mod tests;

use blkpool_core::{Result, VolumeConfig, VolumeOwner};
use std::path::{Path, PathBuf};

/// Lifecycle operations a pool performs on its volumes.
///
/// Calls are blocking and unsynchronised; callers serialise operations on
/// any one volume.
pub trait StoragePool: Send + Sync {
    fn name(&self) -> &str;
    fn dir_path(&self) -> &Path;

    /// Directory holding the images of `owner`.
    fn target_dir(&self, owner: &dyn VolumeOwner) -> Result<PathBuf>;

    /// Build the volume described by `config` for `owner`.
    ///
    /// `pools` is consulted for snapshot and read-only volumes, which live in
    /// the template's pool.
    fn init_volume(
        &self,
        owner: &dyn VolumeOwner,
        config: VolumeConfig,
        pools: &dyn PoolLookup,
    ) -> Result<Volume>;

    fn create(&self, volume: &Volume, source: Option<&Volume>) -> Result<()>;
    fn resize(&self, volume: &mut Volume, size: u64) -> Result<()>;
    fn commit_template_changes(&self, volume: &Volume) -> Result<()>;
    fn start(&self, volume: &Volume) -> Result<()>;
    fn stop(&self, volume: &Volume) -> Result<()>;
}

pub use clone::{CpCloner, FileCloner, NativeCloner};
pub use loopdev::{LoopControl, LoopDevice, Losetup};
pub use pool::FilePool;
pub use registry::{PoolLookup, PoolRegistry};
pub use usage::disk_usage;
pub use volume::{Volume, VolumeInfo, VolumeType};
