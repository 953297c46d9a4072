#![allow(dead_code)]

use futures::stream::BoxStream;
use pinset_core::{
    Cid, DagPathResolver, GcLock, IndirectKeysOptions, Link, MetaValue, Metadata,
    PinClassification, PinMode, PinSets, PinType, PinWriter, PinnedKey,
};
use pinset_store_memory::MemoryPinSets;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Direct pin `a` tagged `x`, recursive pin `b`, and `c` only reachable from `b`.
pub struct Scenario {
    pub store: Arc<CountingPins>,
    pub resolver: DagPathResolver<Arc<MemoryPinSets>>,
    pub a: Cid,
    pub b: Cid,
    pub c: Cid,
}

pub fn tag_x() -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("tag".into(), MetaValue::from("x"));
    meta
}

pub async fn scenario() -> Scenario {
    let inner = Arc::new(MemoryPinSets::new());
    let a = Cid::new(b"object a");
    let b = Cid::new(b"object b");
    let c = Cid::new(b"object c");

    inner.add_link(b, Link::new("c", c)).await.unwrap();
    inner.pin(a, PinMode::Direct, Some(tag_x())).await.unwrap();
    inner.pin(b, PinMode::Recursive, None).await.unwrap();

    Scenario {
        store: Arc::new(CountingPins::new(inner.clone())),
        resolver: DagPathResolver::new(inner),
        a,
        b,
        c,
    }
}

/// Delegating store that counts the calls the engines make.
pub struct CountingPins {
    pub inner: Arc<MemoryPinSets>,
    pub queries: AtomicUsize,
    pub unpins: AtomicUsize,
    pub direct_opened: AtomicUsize,
}

impl CountingPins {
    pub fn new(inner: Arc<MemoryPinSets>) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
            unpins: AtomicUsize::new(0),
            direct_opened: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn unpins(&self) -> usize {
        self.unpins.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PinSets for CountingPins {
    fn recursive_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        self.inner.recursive_keys()
    }

    fn direct_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        self.direct_opened.fetch_add(1, Ordering::SeqCst);
        self.inner.direct_keys()
    }

    fn indirect_keys(&self, options: IndirectKeysOptions) -> BoxStream<'_, anyhow::Result<Cid>> {
        self.inner.indirect_keys(options)
    }

    async fn is_pinned_with_type(
        &self,
        cid: Cid,
        pin_type: PinType,
    ) -> anyhow::Result<PinClassification> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.is_pinned_with_type(cid, pin_type).await
    }

    async fn unpin(&self, cid: Cid) -> anyhow::Result<()> {
        self.unpins.fetch_add(1, Ordering::SeqCst);
        self.inner.unpin(cid).await
    }
}

/// GC lock that records acquisitions and releases.
#[derive(Debug, Clone, Default)]
pub struct CountingLock {
    pub acquired: Arc<AtomicUsize>,
    pub released: Arc<AtomicUsize>,
}

pub struct CountingGuard(Arc<AtomicUsize>);

impl Drop for CountingGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl CountingLock {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn held(&self) -> bool {
        self.acquired() > self.released()
    }
}

#[async_trait::async_trait]
impl GcLock for CountingLock {
    type Guard = CountingGuard;

    async fn read_lock(&self) -> anyhow::Result<CountingGuard> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(CountingGuard(self.released.clone()))
    }
}
