use pinset_store_redb::RedbPinSetsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinsetConfig {
    pub store: PinStoreConfig,
    #[serde(default)]
    pub pin: PinConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum PinStoreConfig {
    Redb(RedbPinSetsConfig),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinConfig {
    /// Overall deadline for one `ls` or `rm` call.
    pub timeout_secs: Option<u64>,
}

impl PinConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl PinStoreConfig {
    pub fn gc_lock_path(&self) -> PathBuf {
        match self {
            Self::Redb(config) => Path::new(&config.path).join("gc.lock"),
        }
    }
}

pub fn load(node_config_file: &Path) -> anyhow::Result<PinsetConfig> {
    use anyhow::Context;
    let toml_content = std::fs::read_to_string(node_config_file).with_context(|| {
        format!(
            "failed to read node config {}, run `pinset config init` first",
            node_config_file.display()
        )
    })?;
    let config = toml::from_str(&toml_content)
        .with_context(|| format!("invalid node config {}", node_config_file.display()))?;
    Ok(config)
}
