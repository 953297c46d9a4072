use super::classify::classify;
use super::error::PinError;
use super::resolve::PathResolver;
use super::source::{PinSource, PinSourceStream};
use super::stream::{PinStream, terminal};
use super::{IndirectKeysOptions, PinEntry, PinEntryType, PinSets, PinType};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Groups in the order an unrestricted listing reports them.
const LISTING_ORDER: [PinType; 3] = [PinType::Recursive, PinType::Indirect, PinType::Direct];

/// Options for [`ls`].
#[derive(Default)]
pub struct ListOptions<'a> {
    /// Defaults to [`PinType::All`].
    pub pin_type: Option<PinType>,
    /// When set, only these paths are checked, in order, each of which
    /// must be pinned as `pin_type`.
    pub paths: Option<PinSourceStream<'a>>,
    pub timeout: Option<Duration>,
}

impl<'a> ListOptions<'a> {
    pub fn with_type(mut self, pin_type: PinType) -> Self {
        self.pin_type = Some(pin_type);
        self
    }

    pub fn with_paths(mut self, paths: PinSourceStream<'a>) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Lists pinned objects.
///
/// Without paths, entries stream straight from the store: recursive
/// roots, then indirect objects (typed plain `indirect`), then direct
/// pins, skipping groups the type filter excludes.
///
/// With paths, each path yields exactly one entry, and an indirect entry
/// names the recursive root that retains it. The first path that is not
/// pinned as the requested type ends the stream with
/// [`PinError::PathNotPinned`]. An empty path stream ends with
/// [`PinError::NoMatch`].
///
/// Listing does not take the GC lock and may observe a batch removal
/// half way through.
pub fn ls<'a, S, R>(
    pins: &'a S,
    resolver: &'a R,
    options: ListOptions<'a>,
) -> PinStream<'a, PinEntry>
where
    S: PinSets + ?Sized,
    R: PathResolver + ?Sized,
{
    let pin_type = options.pin_type.unwrap_or_default();
    let deadline = options.timeout.map(|t| Instant::now() + t);

    let entries = match options.paths {
        Some(paths) => ls_paths(pins, resolver, pin_type, paths),
        None => ls_all(pins, pin_type, IndirectKeysOptions { deadline }),
    };
    terminal(entries, deadline)
}

fn ls_all<'a, S>(
    pins: &'a S,
    pin_type: PinType,
    options: IndirectKeysOptions,
) -> PinStream<'a, PinEntry>
where
    S: PinSets + ?Sized,
{
    debug!(%pin_type, "listing pins");
    stream::iter(LISTING_ORDER.into_iter().filter(move |group| pin_type.includes(*group)))
        .map(move |group| group_entries(pins, group, options))
        .flatten()
        .boxed()
}

/// Entries of one group, opened only once the group is reached.
fn group_entries<'a, S>(
    pins: &'a S,
    group: PinType,
    options: IndirectKeysOptions,
) -> PinStream<'a, PinEntry>
where
    S: PinSets + ?Sized,
{
    match group {
        PinType::Recursive => pins
            .recursive_keys()
            .map_ok(|key| PinEntry::new(PinEntryType::Recursive, key.cid, key.metadata))
            .map_err(PinError::from_store)
            .boxed(),
        PinType::Indirect => pins
            .indirect_keys(options)
            .map_ok(|cid| PinEntry::new(PinEntryType::Indirect { through: None }, cid, None))
            .map_err(PinError::from_store)
            .boxed(),
        PinType::Direct => pins
            .direct_keys()
            .map_ok(|key| PinEntry::new(PinEntryType::Direct, key.cid, key.metadata))
            .map_err(PinError::from_store)
            .boxed(),
        PinType::All => stream::empty().boxed(),
    }
}

struct PathQuery<'a, S: ?Sized, R: ?Sized> {
    pins: &'a S,
    resolver: &'a R,
    pin_type: PinType,
    paths: PinSourceStream<'a>,
    matched: bool,
}

fn ls_paths<'a, S, R>(
    pins: &'a S,
    resolver: &'a R,
    pin_type: PinType,
    paths: PinSourceStream<'a>,
) -> PinStream<'a, PinEntry>
where
    S: PinSets + ?Sized,
    R: PathResolver + ?Sized,
{
    let query = PathQuery {
        pins,
        resolver,
        pin_type,
        paths,
        matched: false,
    };

    stream::try_unfold(query, |mut query| async move {
        let Some(PinSource { path, .. }) = query.paths.next().await else {
            // Only reachable when no path was supplied at all: every
            // supplied path either matches or fails the call.
            return if query.matched {
                Ok(None)
            } else {
                Err(PinError::NoMatch)
            };
        };

        let cid = resolve(query.resolver, &path).await?;
        let classification = query
            .pins
            .is_pinned_with_type(cid, query.pin_type)
            .await
            .map_err(PinError::from_store)?;
        let Some((reason, metadata)) = classification.into_pinned() else {
            return Err(PinError::PathNotPinned { path });
        };

        query.matched = true;
        let entry = classify(reason, metadata).into_entry(cid);
        Ok::<_, PinError>(Some((entry, query)))
    })
    .boxed()
}

pub(crate) async fn resolve<R>(resolver: &R, path: &str) -> Result<crate::Cid, PinError>
where
    R: PathResolver + ?Sized,
{
    resolver
        .resolve(path)
        .await
        .map_err(|source| PinError::Resolution {
            path: path.to_owned(),
            source,
        })
}
