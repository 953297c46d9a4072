use std::path::{Path, PathBuf};

use anyhow::Result;

mod dag;
mod pin;

pub use dag::{DagCmd, run_dag};
pub use pin::{PinCmd, run_pin};

use crate::{config, helpers};

pub async fn run_command(
    node_config_file: PathBuf,
    node_data_dir: &Path,
    cmd: crate::Commands,
) -> Result<()> {
    match cmd {
        crate::Commands::Config { cmd } => cmd.run(node_config_file, node_data_dir),
        crate::Commands::Pin { cmd } => {
            let config = config::load(&node_config_file)?;
            let api = helpers::open_api(&config)?;
            run_pin(cmd, &api, &config.pin).await
        }
        crate::Commands::Dag { cmd } => {
            let config = config::load(&node_config_file)?;
            let api = helpers::open_api(&config)?;
            run_dag(cmd, &api).await
        }
    }
}
