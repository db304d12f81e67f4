use crate::output::{OutputFormat, print_progress, print_success};
use crate::utils::{blocking, format_size, parse_size};
use crate::workspace::Workspace;
use blkpool_core::{Config, Result};

pub async fn execute(
    vm_name: String,
    volume_name: String,
    size: String,
    config: Config,
    _format: OutputFormat,
) -> Result<()> {
    let size = parse_size(&size)?;
    print_progress(&format!(
        "Resizing volume {volume_name} of {vm_name} to {}",
        format_size(size)
    ));

    let vid = blocking(move || {
        let mut workspace = Workspace::open(&config)?;
        let volume = workspace.resize_volume(&vm_name, &volume_name, size)?;
        Ok(volume.vid().display().to_string())
    })
    .await?;

    print_success(&format!("Resized {vid} to {}", format_size(size)));
    Ok(())
}
