use crate::output::{OutputFormat, OutputFormatter, VolumeRow};
use crate::utils::blocking;
use crate::workspace::Workspace;
use blkpool_core::{Config, Result};

pub async fn execute(vm_name: String, config: Config, format: OutputFormat) -> Result<()> {
    let rows = blocking(move || {
        let workspace = Workspace::open(&config)?;
        let vm = workspace.domain(&vm_name)?;
        let rows = workspace
            .volumes(&vm, None)?
            .iter()
            .map(|volume| VolumeRow::from(volume.info()))
            .collect::<Vec<_>>();
        Ok(rows)
    })
    .await?;

    println!("{}", format.format_table(rows));
    Ok(())
}
