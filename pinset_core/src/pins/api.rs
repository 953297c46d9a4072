use super::error::PinError;
use super::gc_lock::GcLock;
use super::ls::resolve;
use super::metadata::Metadata;
use super::resolve::PathResolver;
use super::source::{PinSource, PinSourceStream, normalise};
use super::stream::{PinStream, terminal};
use super::{ListOptions, PinEntry, PinMode, PinSets, PinWriter, RemoveOptions, ls, rm_all};
use crate::Cid;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

/// Pin operations over one store, resolver and GC lock.
///
/// ```ignore
/// use pinset_core::{DagPathResolver, GcCoordinator, ListOptions, PinApi};
/// use pinset_store_memory::MemoryPinSets;
/// use futures::TryStreamExt;
///
/// async fn demo() -> anyhow::Result<()> {
///     let store = std::sync::Arc::new(MemoryPinSets::new());
///     let api = PinApi::new(store.clone(), DagPathResolver::new(store), GcCoordinator::new());
///     let entries: Vec<_> = api.ls(ListOptions::default()).try_collect().await?;
///     println!("{} pins", entries.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PinApi<S, R, G> {
    pins: S,
    resolver: R,
    gc_lock: G,
}

impl<S, R, G> PinApi<S, R, G>
where
    S: PinSets,
    R: PathResolver,
    G: GcLock,
{
    pub fn new(pins: S, resolver: R, gc_lock: G) -> Self {
        Self {
            pins,
            resolver,
            gc_lock,
        }
    }

    pub fn pins(&self) -> &S {
        &self.pins
    }

    pub fn gc_lock(&self) -> &G {
        &self.gc_lock
    }

    /// See [`ls`](super::ls).
    pub fn ls<'a>(&'a self, options: ListOptions<'a>) -> PinStream<'a, PinEntry> {
        ls(&self.pins, &self.resolver, options)
    }

    /// See [`rm_all`](super::rm_all).
    pub fn rm_all<'a>(
        &'a self,
        source: PinSourceStream<'a>,
        options: RemoveOptions,
    ) -> PinStream<'a, Cid> {
        rm_all(&self.pins, &self.resolver, &self.gc_lock, source, options)
    }

    /// Removes a single pin and returns its identifier.
    pub async fn rm(&self, source: impl Into<PinSource>) -> Result<Cid, PinError> {
        let mut removed = self.rm_all(normalise([source.into()]), RemoveOptions::default());
        let mut last = None;
        while let Some(cid) = removed.try_next().await? {
            last = Some(cid);
        }
        last.ok_or(PinError::NoMatch)
    }
}

impl<S, R, G> PinApi<S, R, G>
where
    S: PinWriter,
    R: PathResolver,
    G: GcLock,
{
    /// Pins every resolved path in `mode` under the GC read lock.
    ///
    /// Like removal, the batch is not atomic and stops at the first failure.
    pub fn add_all<'a>(
        &'a self,
        source: PinSourceStream<'a>,
        mode: PinMode,
        metadata: Option<Metadata>,
    ) -> PinStream<'a, Cid> {
        let added = stream::try_unfold(
            (source, None),
            move |(mut source, guard): (PinSourceStream<'a>, Option<G::Guard>)| {
                let metadata = metadata.clone();
                async move {
                    let guard = match guard {
                        Some(guard) => guard,
                        None => self.gc_lock.read_lock().await?,
                    };
                    let Some(PinSource { path, .. }) = source.next().await else {
                        return Ok(None);
                    };
                    let cid = resolve(&self.resolver, &path).await?;
                    self.pins.pin(cid, mode, metadata).await?;
                    info!(%cid, ?mode, "pinned");
                    Ok::<_, PinError>(Some((cid, (source, Some(guard)))))
                }
            },
        );
        terminal(added.boxed(), None)
    }
}
