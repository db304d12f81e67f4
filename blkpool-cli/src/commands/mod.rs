mod commit;
mod create;
mod init;
mod list;
mod resize;
mod start;
mod stop;
mod target_dir;
mod usage;

use blkpool_core::{Config, Result};
use clap::Subcommand;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the directory layout of every configured pool, writing a
    /// default configuration file if there is none
    Init,

    /// Create the backing files of a volume
    Create {
        /// Owning domain
        vm: String,

        /// Volume name
        volume: String,

        /// Domain whose volume is cloned into the new one
        #[arg(long, requires = "from_volume")]
        from_vm: Option<String>,

        /// Volume of --from-vm to clone
        #[arg(long, requires = "from_vm")]
        from_volume: Option<String>,
    },

    /// Grow a volume (shrinking is refused)
    Resize {
        /// Owning domain
        vm: String,

        /// Volume name
        volume: String,

        /// New size in bytes or with K/M/G/T suffix
        size: String,
    },

    /// Reset a template's copy-on-write overlay, keeping one backup
    Commit {
        /// Template domain
        vm: String,

        /// Origin volume name
        volume: String,
    },

    /// Prepare volumes for boot
    Start {
        /// Owning domain
        vm: String,

        /// Volume name (all volumes when omitted)
        volume: Option<String>,
    },

    /// Release volumes after shutdown
    Stop {
        /// Owning domain
        vm: String,

        /// Volume name (all volumes when omitted)
        volume: Option<String>,
    },

    /// Show the volumes of a domain
    List {
        /// Owning domain
        vm: String,
    },

    /// Print the directory holding a domain's images
    TargetDir {
        /// Domain name
        vm: String,

        /// Pool to resolve in
        #[arg(long, default_value = "default")]
        pool: String,
    },

    /// Print the real disk usage of a file or directory
    Usage {
        path: PathBuf,
    },
}

pub async fn execute(
    command: Command,
    config: Config,
    config_path: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    match command {
        Command::Init => init::execute(config, config_path, format).await,
        Command::Create {
            vm,
            volume,
            from_vm,
            from_volume,
        } => {
            let source = from_vm.zip(from_volume);
            create::execute(vm, volume, source, config, format).await
        }
        Command::Resize { vm, volume, size } => {
            resize::execute(vm, volume, size, config, format).await
        }
        Command::Commit { vm, volume } => commit::execute(vm, volume, config, format).await,
        Command::Start { vm, volume } => start::execute(vm, volume, config, format).await,
        Command::Stop { vm, volume } => stop::execute(vm, volume, config, format).await,
        Command::List { vm } => list::execute(vm, config, format).await,
        Command::TargetDir { vm, pool } => target_dir::execute(vm, pool, config, format).await,
        Command::Usage { path } => usage::execute(path, config, format).await,
    }
}
