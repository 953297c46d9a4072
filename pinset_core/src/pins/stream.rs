//! Lazy result streams shared by both engines.

use super::error::PinError;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::time::Instant;

/// A lazy, pull-based sequence of results.
///
/// Dropping the stream abandons the call: nothing further is queried or
/// mutated, and held resources are released.
pub type PinStream<'a, T> = BoxStream<'a, Result<T, PinError>>;

/// Ends `inner` after its first error and enforces an optional deadline.
///
/// The inner stream is dropped as soon as it fails or times out, so any
/// lock it owns is released before the error reaches the caller.
pub(crate) fn terminal<'a, T: Send + 'a>(
    inner: PinStream<'a, T>,
    deadline: Option<Instant>,
) -> PinStream<'a, T> {
    stream::unfold(Some(inner), move |state| async move {
        let mut inner = state?;
        let next = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, inner.next()).await {
                Ok(next) => next,
                Err(_) => Some(Err(PinError::Timeout)),
            },
            None => inner.next().await,
        }?;
        let inner = next.is_ok().then_some(inner);
        Some((next, inner))
    })
    .boxed()
}
