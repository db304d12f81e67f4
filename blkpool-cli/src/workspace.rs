use blkpool_core::{Config, DomainManifest, PoolError, Result, Vm, VolumeOwner};
use blkpool_storage::{PoolRegistry, StoragePool, Volume};
use std::path::PathBuf;
use tracing::{debug, info};

/// Configured pools plus the domain manifest they serve.
pub struct Workspace {
    registry: PoolRegistry,
    manifest: DomainManifest,
    manifest_path: PathBuf,
}

impl Workspace {
    pub fn open(config: &Config) -> Result<Self> {
        let registry = PoolRegistry::from_config(config)?;
        let manifest = DomainManifest::load(&config.manifest)?;
        Ok(Self {
            registry,
            manifest,
            manifest_path: config.manifest.clone(),
        })
    }

    pub fn domain(&self, name: &str) -> Result<Vm> {
        self.manifest.resolve(name)
    }

    pub fn pool_of(&self, volume: &Volume) -> Result<&dyn StoragePool> {
        self.registry.get(volume.pool())
    }

    /// Build the named volume of `vm` through the pool it is configured in.
    pub fn volume(&self, vm: &Vm, name: &str) -> Result<Volume> {
        let config = vm.volume_config(name).cloned().ok_or_else(|| {
            PoolError::ConfigError(format!("Domain {} has no volume {}", vm.name(), name))
        })?;
        let pool = self.registry.get(&config.pool)?;
        let volume = pool.init_volume(vm, config, &self.registry)?;
        debug!(
            "Resolved {} volume {} of {} to {}",
            volume.volume_type(),
            name,
            vm.name(),
            volume.path()
        );
        Ok(volume)
    }

    /// The named volume, or every volume of `vm` when no name is given.
    pub fn volumes(&self, vm: &Vm, name: Option<&str>) -> Result<Vec<Volume>> {
        match name {
            Some(name) => Ok(vec![self.volume(vm, name)?]),
            None => vm
                .volumes()
                .map(|config| self.volume(vm, &config.name))
                .collect(),
        }
    }

    /// Grow a volume and record its new size in the manifest, so later
    /// commits and volatile resets use it.
    pub fn resize_volume(&mut self, vm_name: &str, volume_name: &str, size: u64) -> Result<Volume> {
        let vm = self.domain(vm_name)?;
        let mut volume = self.volume(&vm, volume_name)?;

        // A manifest edited by hand can lag behind the file.
        if let Ok(metadata) = std::fs::metadata(volume.vid())
            && metadata.len() >= size
        {
            return Err(PoolError::InvalidOperation(format!(
                "{} is already {} bytes on disk, refusing to shrink it",
                volume.vid().display(),
                metadata.len()
            )));
        }

        self.pool_of(&volume)?.resize(&mut volume, size)?;

        self.manifest
            .set_volume_size(vm_name, volume_name, volume.size())?;
        self.manifest.save_to(&self.manifest_path)?;
        info!(
            "Recorded size {} of {} volume {} in {}",
            volume.size(),
            vm_name,
            volume_name,
            self.manifest_path.display()
        );
        Ok(volume)
    }
}
