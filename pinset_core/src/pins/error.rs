use crate::Cid;

/// Failures of pin queries and pin mutations.
///
/// Every variant is terminal for the call that produced it. Entries or
/// identifiers yielded before the error remain valid.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PinError {
    #[error("invalid pin type '{0}': expected one of direct, recursive, indirect, all")]
    InvalidPinType(String),
    #[error("could not resolve path '{path}': {source}")]
    Resolution {
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("path '{path}' is not pinned")]
    PathNotPinned { path: String },
    #[error("no match found")]
    NoMatch,
    #[error("{cid} is not pinned")]
    NotPinned { cid: Cid },
    #[error("{cid} is pinned recursively")]
    RecursivePinConflict { cid: Cid },
    #[error("{cid} is pinned indirectly under {parent}")]
    IndirectPin { cid: Cid, parent: Cid },
    #[error("operation timed out")]
    Timeout,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl PinError {
    /// Wraps a store failure, keeping a `PinError` the store raised itself.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<PinError>() {
            Ok(err) => err,
            Err(err) => PinError::Store(err),
        }
    }
}
