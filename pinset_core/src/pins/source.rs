//! Normalizes heterogeneous path inputs into one stream shape.

use crate::Cid;
use futures::stream::{self, BoxStream, Stream, StreamExt};

/// One item of a pin batch.
///
/// `recursive` acknowledges that removing the pin may release a whole
/// retained subgraph. It is ignored by listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinSource {
    pub path: String,
    pub recursive: bool,
}

impl PinSource {
    /// Creates a source item with `recursive` set, the default for
    /// inputs that do not say otherwise.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            recursive: true,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

impl From<Cid> for PinSource {
    fn from(cid: Cid) -> Self {
        PinSource::new(cid.to_string())
    }
}

impl From<&str> for PinSource {
    fn from(path: &str) -> Self {
        PinSource::new(path)
    }
}

impl From<String> for PinSource {
    fn from(path: String) -> Self {
        PinSource::new(path)
    }
}

impl<P: Into<String>> From<(P, bool)> for PinSource {
    fn from((path, recursive): (P, bool)) -> Self {
        PinSource::new(path).recursive(recursive)
    }
}

/// Lazy stream of batch items consumed by the engines.
pub type PinSourceStream<'a> = BoxStream<'a, PinSource>;

/// Normalizes a single value or a collection of values.
///
/// ```
/// use pinset_core::{Cid, PinSource, normalise};
///
/// let one = normalise([Cid::new(b"a")]);
/// let many = normalise(vec!["/path/a", "/path/b"]);
/// let explicit = normalise([PinSource::new("/path/c").recursive(false)]);
/// # let _ = (one, many, explicit);
/// ```
pub fn normalise<I, T>(input: I) -> PinSourceStream<'static>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
    T: Into<PinSource> + 'static,
{
    stream::iter(input.into_iter().map(Into::into)).boxed()
}

/// Normalizes a lazy stream of values; items are converted as they arrive.
pub fn normalise_stream<'a, S, T>(input: S) -> PinSourceStream<'a>
where
    S: Stream<Item = T> + Send + 'a,
    T: Into<PinSource> + 'a,
{
    input.map(Into::into).boxed()
}
