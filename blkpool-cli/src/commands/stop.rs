use crate::output::{OutputFormat, print_progress, print_success};
use crate::utils::blocking;
use crate::workspace::Workspace;
use blkpool_core::{Config, Result};

pub async fn execute(
    vm_name: String,
    volume_name: Option<String>,
    config: Config,
    _format: OutputFormat,
) -> Result<()> {
    print_progress(&format!("Stopping volumes of {vm_name}"));

    let count = blocking(move || {
        let workspace = Workspace::open(&config)?;
        let vm = workspace.domain(&vm_name)?;
        let volumes = workspace.volumes(&vm, volume_name.as_deref())?;
        for volume in &volumes {
            workspace.pool_of(volume)?.stop(volume)?;
        }
        Ok(volumes.len())
    })
    .await?;

    print_success(&format!("Stopped {count} volume(s)"));
    Ok(())
}
