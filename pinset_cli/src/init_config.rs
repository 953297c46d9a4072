use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Subcommand;
use toml_edit::{DocumentMut, Item, Table};
use tracing::info;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the node config file if it doesn't exist, keeping existing settings
    Init,
}

impl CmdConfig {
    pub fn run(self, node_config_file: PathBuf, node_data_dir: &Path) -> anyhow::Result<()> {
        let mut doc = if node_config_file.exists() {
            fs::read_to_string(&node_config_file)?
        } else {
            if let Some(parent) = node_config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            "".to_owned()
        }
        .parse::<DocumentMut>()
        .context("could not parse node config file")?;

        match self {
            Self::Init => {
                let store_path = node_data_dir
                    .to_str()
                    .context("data directory path is not valid UTF-8")?;

                let store = doc
                    .entry("store")
                    .or_insert(Item::Table(Table::new()))
                    .as_table_mut()
                    .context("`store` in node config is not a table")?;
                if !store.contains_key("type") {
                    store.insert("type", "redb".into());
                    store.insert("path", store_path.into());
                }

                doc.entry("pin")
                    .or_insert(Item::Table(Table::new()))
                    .as_table_mut()
                    .context("`pin` in node config is not a table")?;
            }
        }

        info!("writing to config file {node_config_file:?}");

        let tmp_path = node_config_file.with_extension("tmp");
        let mut tmp = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(doc.to_string().as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, node_config_file)?;
        Ok(())
    }
}
