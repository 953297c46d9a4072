use anyhow::{Context, Result, anyhow};
use pinset_core::{DagPathResolver, FileGcLock, Metadata, PinApi, PinEntry, pins::metadata};
use pinset_store_redb::RedbPinSets;
use std::sync::Arc;

use crate::config::{PinStoreConfig, PinsetConfig};

pub type CliPinApi = PinApi<Arc<RedbPinSets>, DagPathResolver<Arc<RedbPinSets>>, FileGcLock>;

/// Opens the configured store together with the resolver and the
/// cross-process GC lock next to it.
pub fn open_api(config: &PinsetConfig) -> Result<CliPinApi> {
    let store = match &config.store {
        PinStoreConfig::Redb(redb) => Arc::new(
            RedbPinSets::create(redb.clone())
                .with_context(|| format!("failed to open pin store at {}", redb.path))?,
        ),
    };
    let gc_lock = FileGcLock::new(config.store.gc_lock_path());
    Ok(PinApi::new(
        store.clone(),
        DagPathResolver::new(store),
        gc_lock,
    ))
}

/// `<cid> <type>` followed by ` key=value` for each metadata entry.
pub fn format_entry(entry: &PinEntry) -> String {
    let mut line = format!("{} {}", entry.cid, entry.pin_type);
    if let Some(meta) = &entry.metadata {
        for (key, value) in meta {
            line.push_str(&format!(" {key}={value}"));
        }
    }
    line
}

pub fn parse_metadata(pairs: &[String]) -> Result<Option<Metadata>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut meta = Metadata::new();
    for pair in pairs {
        let (key, value) = metadata::parse_pair(pair)
            .ok_or_else(|| anyhow!("metadata must look like key=value, got '{pair}'"))?;
        meta.insert(key, value);
    }
    Ok(Some(meta))
}
