use dashmap::DashMap;
use futures::stream::{self, BoxStream, StreamExt};
use pinset_core::dag::{collect_indirect, find_indirect_parent};
use pinset_core::{
    Cid, DagLinks, IndirectKeysOptions, Link, Metadata, PinClassification, PinMode, PinSets,
    PinType, PinWriter, PinnedKey,
};

#[derive(Debug, Clone)]
struct StoredPin {
    mode: PinMode,
    metadata: Option<Metadata>,
}

/// Pin sets and object links held in memory.
///
/// Enumeration takes a snapshot when the stream is first polled and
/// reports identifiers in ascending order.
#[derive(Debug, Default)]
pub struct MemoryPinSets {
    pins: DashMap<Cid, StoredPin>,
    links: DashMap<Cid, Vec<Link>>,
}

impl MemoryPinSets {
    /// Creates a new, empty `MemoryPinSets`.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, mode: PinMode) -> Vec<PinnedKey> {
        let mut keys: Vec<PinnedKey> = self
            .pins
            .iter()
            .filter(|entry| entry.value().mode == mode)
            .map(|entry| PinnedKey {
                cid: *entry.key(),
                metadata: entry.value().metadata.clone(),
            })
            .collect();
        keys.sort_by(|a, b| a.cid.cmp(&b.cid));
        keys
    }

    fn roots(&self) -> Vec<Cid> {
        self.snapshot(PinMode::Recursive)
            .into_iter()
            .map(|key| key.cid)
            .collect()
    }

    fn keys(&self, mode: PinMode) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        stream::once(async move { self.snapshot(mode) })
            .flat_map(|keys| stream::iter(keys.into_iter().map(Ok)))
            .boxed()
    }
}

#[async_trait::async_trait]
impl PinSets for MemoryPinSets {
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
        stream::once(async move { collect_indirect(self, &self.roots(), options).await })
            .flat_map(|result| match result {
                Ok(cids) => stream::iter(cids.into_iter().map(Ok).collect::<Vec<_>>()),
                Err(err) => stream::iter(vec![Err(err)]),
            })
            .boxed()
    }

    async fn is_pinned_with_type(
        &self,
        cid: Cid,
        pin_type: PinType,
    ) -> anyhow::Result<PinClassification> {
        let stored = self.pins.get(&cid).map(|entry| entry.value().clone());

        if pin_type.includes(PinType::Recursive) {
            if let Some(StoredPin {
                mode: PinMode::Recursive,
                metadata,
            }) = &stored
            {
                return Ok(PinClassification::recursive(metadata.clone()));
            }
            if pin_type == PinType::Recursive {
                return Ok(PinClassification::not_pinned());
            }
        }

        if pin_type.includes(PinType::Direct) {
            if let Some(StoredPin {
                mode: PinMode::Direct,
                metadata,
            }) = &stored
            {
                return Ok(PinClassification::direct(metadata.clone()));
            }
            if pin_type == PinType::Direct {
                return Ok(PinClassification::not_pinned());
            }
        }

        Ok(match find_indirect_parent(self, &self.roots(), cid).await? {
            Some(parent) => PinClassification::indirect(parent),
            None => PinClassification::not_pinned(),
        })
    }

    async fn unpin(&self, cid: Cid) -> anyhow::Result<()> {
        self.pins.remove(&cid);
        Ok(())
    }
}

#[async_trait::async_trait]
impl DagLinks for MemoryPinSets {
    async fn links(&self, cid: Cid) -> anyhow::Result<Vec<Link>> {
        Ok(self
            .links
            .get(&cid)
            .map(|links| links.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl PinWriter for MemoryPinSets {
    async fn pin(
        &self,
        cid: Cid,
        mode: PinMode,
        metadata: Option<Metadata>,
    ) -> anyhow::Result<()> {
        self.pins.insert(cid, StoredPin { mode, metadata });
        Ok(())
    }

    async fn add_link(&self, parent: Cid, link: Link) -> anyhow::Result<()> {
        let mut links = self.links.entry(parent).or_default();
        if !links.contains(&link) {
            links.push(link);
        }
        Ok(())
    }
}
