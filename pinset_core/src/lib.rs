//! Pin query and pin mutation engine for content-addressed object stores.
//!
//! An object in a content-addressed store is protected from garbage
//! collection when it is pinned. This crate answers two questions about
//! that protection:
//!
//! - which objects are pinned, and why ([`pins::ls`]), and
//! - how to release a batch of pins safely ([`pins::rm_all`]).
//!
//! ## Pin vocabulary
//!
//! - A *direct* pin protects exactly one object.
//! - A *recursive* pin protects an object and everything reachable from it.
//! - An *indirect* pin is never stored; it is derived from reachability
//!   below some recursive root.
//!
//! ## Collaborators
//!
//! The engines do not own any state. They consume:
//!
//! - a pin-set store ([`PinSets`]), implemented by `pinset_store_memory`
//!   and `pinset_store_redb`,
//! - a path resolver ([`PathResolver`]), usually a [`DagPathResolver`],
//! - a garbage-collection lock ([`GcLock`]) that mutations hold in shared
//!   mode for the whole batch.
//!
//! All results are produced as lazy [`PinStream`]s. Dropping a stream
//! before it is exhausted stops all further work and releases any lock
//! the stream holds.

pub mod cid;
pub mod dag;
pub mod pins;

// Test utilities (behind feature flag)
#[cfg(feature = "testutil")]
pub mod testutil;

pub use cid::Cid;

pub use pins::api::PinApi;
pub use pins::error::PinError;
pub use pins::gc_lock::{GcCoordinator, GcLock};
pub use pins::metadata::{MetaValue, Metadata};
pub use pins::resolve::{DagPathResolver, PathResolver};
pub use pins::source::{PinSource, PinSourceStream, normalise, normalise_stream};
pub use pins::stream::PinStream;
pub use pins::{
    DagLinks, IndirectKeysOptions, Link, ListOptions, PinClassification, PinEntry, PinEntryType,
    PinMode, PinReason, PinSets, PinType, PinWriter, PinnedKey, RemoveOptions, ls, rm_all,
};

// Cross-process GC lock (native only - uses advisory file locks)
#[cfg(not(target_arch = "wasm32"))]
pub use pins::gc_lock::FileGcLock;
