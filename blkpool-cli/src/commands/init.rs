use crate::output::{OutputFormat, print_info, print_progress, print_success};
use crate::utils::blocking;
use blkpool_core::{Config, Result};
use blkpool_storage::PoolRegistry;
use std::path::{Path, PathBuf};

pub async fn execute(config: Config, config_path: PathBuf, _format: OutputFormat) -> Result<()> {
    print_progress(&format!("Initializing {} pool(s)", config.pools.len()));

    let (written, pools) = blocking(move || {
        let written = write_config_if_missing(&config, &config_path)?;
        let registry = PoolRegistry::from_config(&config)?;
        let pools = registry
            .iter()
            .map(|pool| (pool.name().to_string(), pool.dir_path().to_path_buf()))
            .collect::<Vec<_>>();
        Ok((written.then_some(config_path), pools))
    })
    .await?;

    if let Some(path) = written {
        print_info(&format!("Wrote configuration to {}", path.display()));
    }
    for (name, dir_path) in pools {
        print_success(&format!("Pool {name} ready at {}", dir_path.display()));
    }
    Ok(())
}

/// Persist the effective configuration unless a file is already there.
fn write_config_if_missing(config: &Config, path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    config.save_to(path)?;
    Ok(true)
}
