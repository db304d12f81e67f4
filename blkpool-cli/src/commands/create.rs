use crate::output::{OutputFormat, print_info, print_progress, print_success};
use crate::utils::blocking;
use crate::workspace::Workspace;
use blkpool_core::{Config, Result};

pub async fn execute(
    vm_name: String,
    volume_name: String,
    source: Option<(String, String)>,
    config: Config,
    _format: OutputFormat,
) -> Result<()> {
    print_progress(&format!("Creating volume {volume_name} of {vm_name}"));
    if let Some((source_vm, source_volume)) = &source {
        print_info(&format!("Cloning from volume {source_volume} of {source_vm}"));
    }

    let path = blocking(move || {
        let workspace = Workspace::open(&config)?;
        let vm = workspace.domain(&vm_name)?;
        let volume = workspace.volume(&vm, &volume_name)?;

        let source = match source {
            Some((source_vm, source_volume)) => {
                let source_vm = workspace.domain(&source_vm)?;
                Some(workspace.volume(&source_vm, &source_volume)?)
            }
            None => None,
        };

        workspace
            .pool_of(&volume)?
            .create(&volume, source.as_ref())?;
        Ok(volume.path())
    })
    .await?;

    print_success(&format!("Created {path}"));
    Ok(())
}
