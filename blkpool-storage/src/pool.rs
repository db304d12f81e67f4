use crate::clone::{CpCloner, FileCloner, NativeCloner, copy_file};
use crate::loopdev::{LoopControl, Losetup, refresh_capacity};
use crate::sparse::{
    create_dir_if_missing, create_shared_sparse_file, create_sparse_file, recreate_sparse_file,
    truncate_file,
};
use crate::volume::{Volume, VolumeParams, VolumeType};
use crate::{PoolLookup, StoragePool};
use blkpool_core::layout::{APPVMS_DIR, DISPOSABLE_SUFFIX, OLD_SUFFIX, TEMPLATES_DIR};
use blkpool_core::{
    CloneMethod, DomainClass, PoolError, PoolSettings, Result, ToolSettings, VolumeConfig,
    VolumeOwner,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pool of plain image files under one directory:
///
/// ```text
/// <dir_path>/appvms/<vm>/...
/// <dir_path>/vm-templates/<template>/...
/// ```
pub struct FilePool {
    name: String,
    dir_path: PathBuf,
    loop_control: Box<dyn LoopControl>,
    cloner: Box<dyn FileCloner>,
}

impl FilePool {
    /// Open the pool at `dir_path` with `sudo losetup` and `cp`.
    pub fn new(name: impl Into<String>, dir_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_backends(
            name,
            dir_path,
            Box::new(Losetup::locate(true)),
            Box::new(CpCloner::locate()),
        )
    }

    pub fn from_settings(settings: &PoolSettings, tools: &ToolSettings) -> Result<Self> {
        let loop_control: Box<dyn LoopControl> = match &tools.losetup {
            Some(path) => Box::new(Losetup::new(path.clone(), tools.use_sudo)),
            None => Box::new(Losetup::locate(tools.use_sudo)),
        };
        let cloner: Box<dyn FileCloner> = match (tools.clone_method, &tools.cp) {
            (CloneMethod::Native, _) => Box::new(NativeCloner),
            (CloneMethod::Cp, Some(path)) => Box::new(CpCloner::new(path.clone())),
            (CloneMethod::Cp, None) => Box::new(CpCloner::locate()),
        };
        Self::with_backends(&settings.name, &settings.dir_path, loop_control, cloner)
    }

    pub fn with_backends(
        name: impl Into<String>,
        dir_path: impl AsRef<Path>,
        loop_control: Box<dyn LoopControl>,
        cloner: Box<dyn FileCloner>,
    ) -> Result<Self> {
        let name = name.into();
        let dir_path = dir_path.as_ref();
        if dir_path.as_os_str().is_empty() {
            return Err(PoolError::ConfigurationInvalid(format!(
                "No dir_path specified for pool {name}"
            )));
        }

        let pool = Self {
            name,
            dir_path: std::path::absolute(dir_path)?,
            loop_control,
            cloner,
        };
        pool.ensure_layout()?;
        Ok(pool)
    }

    pub fn appvms_dir(&self) -> PathBuf {
        self.dir_path.join(APPVMS_DIR)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.dir_path.join(TEMPLATES_DIR)
    }

    /// Create the pool directory and its two subdirectories if missing.
    pub fn ensure_layout(&self) -> Result<()> {
        if !self.dir_path.exists() {
            fs::create_dir_all(&self.dir_path)?;
            debug!("Created pool directory {}", self.dir_path.display());
        }
        create_dir_if_missing(&self.appvms_dir())?;
        create_dir_if_missing(&self.templates_dir())?;
        Ok(())
    }

    /// Wipe a volatile image back to an empty file of its configured size.
    fn reset_volume(&self, volume: &Volume) -> Result<()> {
        let Volume::Volatile(volatile) = volume else {
            return Err(PoolError::InvalidOperation(format!(
                "Can not reset a {} volume {}",
                volume.volume_type(),
                volume.vid().display()
            )));
        };
        if volume.size() == 0 {
            return Err(PoolError::ConfigurationInvalid(format!(
                "Volatile volume {} has no size",
                volume.name()
            )));
        }

        debug!("Resetting volatile image {}", volatile.path().display());
        recreate_sparse_file(volatile.path(), volume.size())
    }
}

fn check_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PoolError::MissingImage(path.to_path_buf()));
    }
    Ok(())
}

impl StoragePool for FilePool {
    fn name(&self) -> &str {
        &self.name
    }

    fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    fn target_dir(&self, owner: &dyn VolumeOwner) -> Result<PathBuf> {
        let dir = match owner.class() {
            DomainClass::Template => self.templates_dir().join(owner.name()),
            DomainClass::Disposable => {
                let template = owner.template().ok_or_else(|| {
                    PoolError::ConfigurationInvalid(format!(
                        "Disposable {} has no template",
                        owner.name()
                    ))
                })?;
                self.templates_dir()
                    .join(format!("{}{}", template.name(), DISPOSABLE_SUFFIX))
            }
            DomainClass::Regular => self.appvms_dir().join(owner.name()),
        };
        Ok(dir)
    }

    fn init_volume(
        &self,
        owner: &dyn VolumeOwner,
        config: VolumeConfig,
        pools: &dyn PoolLookup,
    ) -> Result<Volume> {
        let tag = config.volume_type.as_deref().ok_or_else(|| {
            PoolError::ConfigurationInvalid(format!("Volume type missing for {}", config.name))
        })?;
        let volume_type = VolumeType::from_tag(tag)?;

        let (target_dir, size) = if volume_type.derives_from_template() {
            let template = owner.template().ok_or_else(|| {
                PoolError::ConfigurationInvalid(format!(
                    "{} volume {} of {} needs a template",
                    volume_type,
                    config.name,
                    owner.name()
                ))
            })?;
            let origin_pool = pools.pool(&config.pool).ok_or_else(|| {
                PoolError::ConfigurationInvalid(format!("Unknown pool {}", config.pool))
            })?;
            let template_config = template.volume_config(&config.name).ok_or_else(|| {
                PoolError::ConfigurationInvalid(format!(
                    "Template {} has no volume {}",
                    template.name(),
                    config.name
                ))
            })?;

            let size = template_config.size.unwrap_or(0);
            if config.size.is_some_and(|s| s != size) {
                debug!(
                    "Volume {} of {} takes size {} from template {}",
                    config.name,
                    owner.name(),
                    size,
                    template.name()
                );
            }
            (origin_pool.target_dir(template)?, size)
        } else {
            (self.target_dir(owner)?, config.size.unwrap_or(0))
        };

        volume_type.construct(VolumeParams {
            name: config.name,
            pool: config.pool,
            vid: config.vid,
            size,
            target_dir,
        })
    }

    fn create(&self, volume: &Volume, source: Option<&Volume>) -> Result<()> {
        self.ensure_layout()?;
        let size = volume.size();

        match volume {
            Volume::Origin(origin) => {
                info!(
                    "Creating origin volume {} ({} bytes) in {}",
                    volume.name(),
                    size,
                    volume.target_dir().display()
                );
                create_sparse_file(origin.path_origin(), size)?;
                create_sparse_file(origin.path_cow(), size)?;
            }
            Volume::ReadWrite(rw) => match source {
                Some(source) => {
                    info!("Creating volume {} from {}", volume.name(), source.name());
                    copy_file(self.cloner.as_ref(), source.vid(), rw.path())?;
                }
                None => {
                    info!("Creating volume {} ({} bytes)", volume.name(), size);
                    create_sparse_file(rw.path(), size)?;
                }
            },
            Volume::Volatile(volatile) => {
                info!("Creating volatile volume {} ({} bytes)", volume.name(), size);
                create_sparse_file(volatile.path(), size)?;
            }
            Volume::ReadOnly(_) | Volume::Snapshot(_) => {
                debug!(
                    "Nothing to create for {} volume {}",
                    volume.volume_type(),
                    volume.name()
                );
            }
        }

        Ok(())
    }

    fn resize(&self, volume: &mut Volume, size: u64) -> Result<()> {
        let volume_type = volume.volume_type();
        if !volume_type.is_resizable() {
            return Err(PoolError::InvalidOperation(format!(
                "Can not resize a {} volume {}",
                volume_type,
                volume.vid().display()
            )));
        }

        if size <= volume.size() {
            return Err(PoolError::InvalidOperation(format!(
                "For your own safety, shrinking of {} is disabled. If you really know what \
                 you are doing, use `truncate` on {} manually.",
                volume.name(),
                volume.vid().display()
            )));
        }

        self.ensure_layout()?;
        // For an origin the vid is the origin half; the overlay keeps its size.
        let path = volume.vid().to_path_buf();
        info!(
            "Resizing {} from {} to {} bytes",
            path.display(),
            volume.size(),
            size
        );
        truncate_file(&path, size)?;
        volume.set_size(size);

        refresh_capacity(self.loop_control.as_ref(), &path)?;
        Ok(())
    }

    fn commit_template_changes(&self, volume: &Volume) -> Result<()> {
        let Volume::Origin(origin) = volume else {
            return Ok(());
        };
        self.ensure_layout()?;

        let cow = origin.path_cow();
        if cow.exists() {
            let mut old = cow.as_os_str().to_owned();
            old.push(OLD_SUFFIX);
            let old = PathBuf::from(old);
            fs::rename(cow, &old)?;
            debug!("Moved {} to {}", cow.display(), old.display());
        }

        info!("Resetting copy-on-write overlay {}", cow.display());
        create_shared_sparse_file(cow, volume.size())
    }

    fn start(&self, volume: &Volume) -> Result<()> {
        self.ensure_layout()?;
        if volume.volume_type() == VolumeType::Volatile {
            self.reset_volume(volume)?;
        }

        for path in volume.image_paths() {
            check_path(path)?;
        }
        debug!("Volume {} ready", volume.name());
        Ok(())
    }

    fn stop(&self, volume: &Volume) -> Result<()> {
        debug!("Stopping volume {}", volume.name());
        Ok(())
    }
}
