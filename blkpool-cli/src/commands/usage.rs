use crate::output::{OutputFormat, OutputFormatter};
use crate::utils::{blocking, format_size};
use blkpool_core::{Config, Result};
use blkpool_storage::disk_usage;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct Usage {
    path: PathBuf,
    usage: u64,
}

pub async fn execute(path: PathBuf, _config: Config, format: OutputFormat) -> Result<()> {
    let usage = blocking(move || {
        let usage = disk_usage(&path);
        Ok(Usage { path, usage })
    })
    .await?;

    match format {
        OutputFormat::Table => println!(
            "{}\t{} ({})",
            usage.path.display(),
            usage.usage,
            format_size(usage.usage)
        ),
        _ => println!("{}", format.format(usage)),
    }
    Ok(())
}
