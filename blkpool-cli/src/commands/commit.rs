use crate::output::{OutputFormat, print_progress, print_success, print_warning};
use crate::utils::blocking;
use crate::workspace::Workspace;
use blkpool_core::{Config, Result};
use blkpool_storage::VolumeType;

pub async fn execute(
    vm_name: String,
    volume_name: String,
    config: Config,
    _format: OutputFormat,
) -> Result<()> {
    print_progress(&format!(
        "Committing template changes of {volume_name} in {vm_name}"
    ));

    let volume_type = blocking(move || {
        let workspace = Workspace::open(&config)?;
        let vm = workspace.domain(&vm_name)?;
        let volume = workspace.volume(&vm, &volume_name)?;
        workspace
            .pool_of(&volume)?
            .commit_template_changes(&volume)?;
        Ok(volume.volume_type())
    })
    .await?;

    if volume_type == VolumeType::Origin {
        print_success("Copy-on-write overlay reset");
    } else {
        print_warning(&format!(
            "Nothing to commit for a {volume_type} volume"
        ));
    }
    Ok(())
}
