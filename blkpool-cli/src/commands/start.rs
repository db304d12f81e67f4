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
    print_progress(&format!("Starting volumes of {vm_name}"));

    let started = blocking(move || {
        let workspace = Workspace::open(&config)?;
        let vm = workspace.domain(&vm_name)?;
        let volumes = workspace.volumes(&vm, volume_name.as_deref())?;

        let mut started = Vec::with_capacity(volumes.len());
        for volume in &volumes {
            workspace.pool_of(volume)?.start(volume)?;
            started.push(volume.path());
        }
        Ok(started)
    })
    .await?;

    for path in started {
        print_success(&format!("Ready: {path}"));
    }
    Ok(())
}
