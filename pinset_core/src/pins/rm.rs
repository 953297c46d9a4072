use super::error::PinError;
use super::gc_lock::GcLock;
use super::ls::resolve;
use super::resolve::PathResolver;
use super::source::{PinSource, PinSourceStream};
use super::stream::{PinStream, terminal};
use super::{PinReason, PinSets, PinType};
use crate::Cid;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Options for [`rm_all`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    pub timeout: Option<Duration>,
}

enum Removal<'a, G> {
    /// Nothing pulled yet; the lock is not taken.
    Pending(PinSourceStream<'a>),
    Running {
        source: PinSourceStream<'a>,
        guard: G,
    },
}

/// Removes a batch of pins, yielding each identifier once it is unpinned.
///
/// The GC read lock is taken on the first pull and held until the stream
/// ends, fails, or is dropped. Items are processed one at a time in
/// arrival order:
///
/// - an object that is not pinned fails the batch with [`PinError::NotPinned`],
/// - a recursive pin is removed only if its item sets `recursive`,
///   otherwise the batch fails with [`PinError::RecursivePinConflict`],
/// - a direct pin is always removed,
/// - an indirect pin fails the batch with [`PinError::IndirectPin`]; it can
///   only be released through its recursive root.
///
/// The batch is not atomic. Pins removed before a failing item stay
/// removed, and their identifiers have already been yielded.
pub fn rm_all<'a, S, R, G>(
    pins: &'a S,
    resolver: &'a R,
    gc_lock: &'a G,
    source: PinSourceStream<'a>,
    options: RemoveOptions,
) -> PinStream<'a, Cid>
where
    S: PinSets + ?Sized,
    R: PathResolver + ?Sized,
    G: GcLock + ?Sized,
{
    let deadline = options.timeout.map(|t| Instant::now() + t);

    let removed = stream::try_unfold(Removal::Pending(source), move |removal| async move {
        let (mut source, guard) = match removal {
            Removal::Pending(source) => {
                let guard = gc_lock.read_lock().await?;
                debug!("pin removal batch started");
                (source, guard)
            }
            Removal::Running { source, guard } => (source, guard),
        };

        let Some(PinSource { path, recursive }) = source.next().await else {
            debug!("pin removal batch finished");
            return Ok(None);
        };

        let cid = resolve(resolver, &path).await?;
        let classification = pins
            .is_pinned_with_type(cid, PinType::All)
            .await
            .map_err(PinError::from_store)?;
        let Some((reason, _)) = classification.into_pinned() else {
            return Err(PinError::NotPinned { cid });
        };

        match reason {
            PinReason::Recursive if !recursive => {
                return Err(PinError::RecursivePinConflict { cid });
            }
            PinReason::Recursive | PinReason::Direct => {
                pins.unpin(cid).await?;
                info!(%cid, ?reason, "unpinned");
            }
            PinReason::Indirect { parent } => {
                return Err(PinError::IndirectPin { cid, parent });
            }
        }

        Ok::<_, PinError>(Some((cid, Removal::Running { source, guard })))
    });

    terminal(removed.boxed(), deadline)
}
