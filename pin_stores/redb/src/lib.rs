//! RedbPinSets - A persistent pin-set store backed by redb.

use anyhow::{Context, anyhow, bail};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use pinset_core::dag::{collect_indirect, find_indirect_parent};
use pinset_core::pins::metadata as codec;
use pinset_core::{
    Cid, DagLinks, IndirectKeysOptions, Link, Metadata, PinClassification, PinMode, PinSets,
    PinType, PinWriter, PinnedKey,
};
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use std::{path::Path, sync::Arc};

/// cid -> (mode, CBOR metadata)
const PINS: TableDefinition<&[u8], (u8, &[u8])> = TableDefinition::new("pins");
/// cid -> CBOR list of links
const LINKS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("links");

const MODE_DIRECT: u8 = 0;
const MODE_RECURSIVE: u8 = 1;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct RedbPinSetsConfig {
    /// Directory holding `pins.redb`.
    pub path: String,
}

/// Pin sets and object links persisted in a redb database.
///
/// A single `pins` table stores both direct and recursive pins, so an
/// object can never hold both at once.
#[derive(Clone)]
pub struct RedbPinSets {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbPinSets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbPinSets").finish()
    }
}

fn mode_to_byte(mode: PinMode) -> u8 {
    match mode {
        PinMode::Direct => MODE_DIRECT,
        PinMode::Recursive => MODE_RECURSIVE,
    }
}

fn mode_from_byte(byte: u8) -> anyhow::Result<PinMode> {
    match byte {
        MODE_DIRECT => Ok(PinMode::Direct),
        MODE_RECURSIVE => Ok(PinMode::Recursive),
        other => bail!("unknown pin mode byte {other:#x}"),
    }
}

fn cid_from_key(key: &[u8]) -> anyhow::Result<Cid> {
    Cid::try_from(key).map_err(|_| anyhow!("stored key has {} bytes, expected 32", key.len()))
}

fn decode_links(bytes: &[u8]) -> anyhow::Result<Vec<Link>> {
    minicbor::decode(bytes).map_err(|e| anyhow!("CBOR decode failed: {}", e))
}

impl RedbPinSets {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create store directory {}", path.display()))?;
        let db = Database::create(path.join("pins.redb"))?;

        // Create both tables up front so first reads on a fresh database
        // do not fail with a missing table.
        {
            let write_txn = db.begin_write()?;
            {
                let _ = write_txn.open_table(PINS)?;
                let _ = write_txn.open_table(LINKS)?;
            }
            write_txn.commit()?;
        }

        Ok(Self { db: Arc::new(db) })
    }

    pub fn create(config: RedbPinSetsConfig) -> anyhow::Result<Self> {
        Self::open(config.path)
    }

    async fn read<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&ReadTransaction) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let read_txn = db.begin_read()?;
            f(&read_txn)
        })
        .await
        .map_err(|e| anyhow!("redb read task failed: {}", e))?
    }

    async fn write<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTransaction) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let write_txn = db.begin_write()?;
            let out = f(&write_txn)?;
            write_txn.commit()?;
            Ok(out)
        })
        .await
        .map_err(|e| anyhow!("redb write task failed: {}", e))?
    }

    async fn scan(&self, mode: PinMode) -> anyhow::Result<Vec<PinnedKey>> {
        let wanted = mode_to_byte(mode);
        self.read(move |txn| {
            let table = txn.open_table(PINS)?;
            let mut keys = Vec::new();
            for row in table.iter()? {
                let (key, value) = row?;
                let (stored_mode, meta) = value.value();
                if stored_mode != wanted {
                    continue;
                }
                keys.push(PinnedKey {
                    cid: cid_from_key(key.value())?,
                    metadata: codec::decode(meta)?,
                });
            }
            Ok(keys)
        })
        .await
    }

    fn keys(&self, mode: PinMode) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        stream::once(self.scan(mode))
            .map_ok(|keys| stream::iter(keys.into_iter().map(Ok::<_, anyhow::Error>)))
            .try_flatten()
            .boxed()
    }

    async fn roots(&self) -> anyhow::Result<Vec<Cid>> {
        Ok(self
            .scan(PinMode::Recursive)
            .await?
            .into_iter()
            .map(|key| key.cid)
            .collect())
    }

    async fn stored(&self, cid: Cid) -> anyhow::Result<Option<(PinMode, Option<Metadata>)>> {
        self.read(move |txn| {
            let table = txn.open_table(PINS)?;
            let Some(guard) = table.get(cid.as_bytes().as_slice())? else {
                return Ok(None);
            };
            let (mode, meta) = guard.value();
            Ok(Some((mode_from_byte(mode)?, codec::decode(meta)?)))
        })
        .await
    }
}

#[async_trait::async_trait]
impl PinSets for RedbPinSets {
    fn recursive_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        self.keys(PinMode::Recursive)
    }

    fn direct_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        self.keys(PinMode::Direct)
    }

    fn indirect_keys(
        &self,
        options: IndirectKeysOptions,
    ) -> BoxStream<'_, anyhow::Result<Cid>> {
        stream::once(async move {
            let roots = self.roots().await?;
            collect_indirect(self, &roots, options).await
        })
        .map_ok(|cids| stream::iter(cids.into_iter().map(Ok::<_, anyhow::Error>)))
        .try_flatten()
        .boxed()
    }

    async fn is_pinned_with_type(
        &self,
        cid: Cid,
        pin_type: PinType,
    ) -> anyhow::Result<PinClassification> {
        let stored = self.stored(cid).await?;

        if pin_type.includes(PinType::Recursive) {
            if let Some((PinMode::Recursive, metadata)) = &stored {
                return Ok(PinClassification::recursive(metadata.clone()));
            }
            if pin_type == PinType::Recursive {
                return Ok(PinClassification::not_pinned());
            }
        }

        if pin_type.includes(PinType::Direct) {
            if let Some((PinMode::Direct, metadata)) = &stored {
                return Ok(PinClassification::direct(metadata.clone()));
            }
            if pin_type == PinType::Direct {
                return Ok(PinClassification::not_pinned());
            }
        }

        let roots = self.roots().await?;
        Ok(match find_indirect_parent(self, &roots, cid).await? {
            Some(parent) => PinClassification::indirect(parent),
            None => PinClassification::not_pinned(),
        })
    }

    async fn unpin(&self, cid: Cid) -> anyhow::Result<()> {
        self.write(move |txn| {
            let mut table = txn.open_table(PINS)?;
            table.remove(cid.as_bytes().as_slice())?;
            Ok(())
        })
        .await
    }
}

#[async_trait::async_trait]
impl DagLinks for RedbPinSets {
    async fn links(&self, cid: Cid) -> anyhow::Result<Vec<Link>> {
        self.read(move |txn| {
            let table = txn.open_table(LINKS)?;
            match table.get(cid.as_bytes().as_slice())? {
                Some(guard) => decode_links(guard.value()),
                None => Ok(Vec::new()),
            }
        })
        .await
    }
}

#[async_trait::async_trait]
impl PinWriter for RedbPinSets {
    async fn pin(
        &self,
        cid: Cid,
        mode: PinMode,
        metadata: Option<Metadata>,
    ) -> anyhow::Result<()> {
        let meta = codec::encode(metadata.as_ref())?;
        self.write(move |txn| {
            let mut table = txn.open_table(PINS)?;
            table.insert(cid.as_bytes().as_slice(), (mode_to_byte(mode), meta.as_slice()))?;
            Ok(())
        })
        .await
    }

    async fn add_link(&self, parent: Cid, link: Link) -> anyhow::Result<()> {
        self.write(move |txn| {
            let mut table = txn.open_table(LINKS)?;
            let mut links = match table.get(parent.as_bytes().as_slice())? {
                Some(guard) => decode_links(guard.value())?,
                None => Vec::new(),
            };
            if links.contains(&link) {
                return Ok(());
            }
            links.push(link);
            let bytes = minicbor::to_vec(&links)?;
            table.insert(parent.as_bytes().as_slice(), bytes.as_slice())?;
            Ok(())
        })
        .await
    }
}
