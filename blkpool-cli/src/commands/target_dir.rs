use crate::output::{OutputFormat, OutputFormatter};
use crate::utils::blocking;
use blkpool_core::{Config, DomainManifest, Result};
use blkpool_storage::PoolRegistry;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct TargetDir {
    vm: String,
    pool: String,
    target_dir: PathBuf,
}

pub async fn execute(
    vm_name: String,
    pool_name: String,
    config: Config,
    format: OutputFormat,
) -> Result<()> {
    let resolved = blocking(move || {
        let registry = PoolRegistry::from_config(&config)?;
        let manifest = DomainManifest::load(&config.manifest)?;
        let vm = manifest.resolve(&vm_name)?;
        let target_dir = registry.get(&pool_name)?.target_dir(&vm)?;
        Ok(TargetDir {
            vm: vm_name,
            pool: pool_name,
            target_dir,
        })
    })
    .await?;

    match format {
        OutputFormat::Table => println!("{}", resolved.target_dir.display()),
        _ => println!("{}", format.format(resolved)),
    }
    Ok(())
}
