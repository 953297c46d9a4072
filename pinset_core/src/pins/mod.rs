pub mod api;
pub mod classify;
pub mod error;
pub mod gc_lock;
mod ls;
pub mod metadata;
pub mod resolve;
mod rm;
pub mod source;
pub mod stream;

pub use ls::{ListOptions, ls};
pub use rm::{RemoveOptions, rm_all};

use crate::Cid;
use error::PinError;
use futures::stream::BoxStream;
use metadata::Metadata;
use minicbor::{Decode, Encode};
use std::fmt;
use std::str::FromStr;
use tokio::time::Instant;

/// Pin type used to filter queries.
///
/// `All` is a query wildcard; no single object is ever stored as `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PinType {
    Direct,
    Recursive,
    Indirect,
    #[default]
    All,
}

impl PinType {
    /// Returns true if a query for `self` should include objects of `group`.
    pub fn includes(self, group: PinType) -> bool {
        self == PinType::All || self == group
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinType::Direct => "direct",
            PinType::Recursive => "recursive",
            PinType::Indirect => "indirect",
            PinType::All => "all",
        }
    }
}

impl FromStr for PinType {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(PinType::Direct),
            "recursive" => Ok(PinType::Recursive),
            "indirect" => Ok(PinType::Indirect),
            "all" => Ok(PinType::All),
            _ => Err(PinError::InvalidPinType(s.to_owned())),
        }
    }
}

impl fmt::Display for PinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two pin kinds that can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinMode {
    Direct,
    Recursive,
}

impl From<PinMode> for PinType {
    fn from(mode: PinMode) -> Self {
        match mode {
            PinMode::Direct => PinType::Direct,
            PinMode::Recursive => PinType::Recursive,
        }
    }
}

/// Why an object is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinReason {
    Direct,
    Recursive,
    /// Reachable from the recursive root `parent`.
    Indirect { parent: Cid },
}

/// Answer to "is this object pinned as type T?".
///
/// `metadata` is only ever set for direct and recursive pins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PinClassification {
    pub pinned: bool,
    pub reason: Option<PinReason>,
    pub metadata: Option<Metadata>,
}

impl PinClassification {
    pub fn not_pinned() -> Self {
        Self::default()
    }

    pub fn direct(metadata: Option<Metadata>) -> Self {
        Self {
            pinned: true,
            reason: Some(PinReason::Direct),
            metadata,
        }
    }

    pub fn recursive(metadata: Option<Metadata>) -> Self {
        Self {
            pinned: true,
            reason: Some(PinReason::Recursive),
            metadata,
        }
    }

    pub fn indirect(parent: Cid) -> Self {
        Self {
            pinned: true,
            reason: Some(PinReason::Indirect { parent }),
            metadata: None,
        }
    }

    /// Returns the reason and metadata if the object is pinned.
    pub fn into_pinned(self) -> Option<(PinReason, Option<Metadata>)> {
        match (self.pinned, self.reason) {
            (true, Some(reason)) => Some((reason, self.metadata)),
            _ => None,
        }
    }
}

/// Type column of a listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinEntryType {
    Direct,
    Recursive,
    /// `through` is only known when a single object was queried by path.
    Indirect { through: Option<Cid> },
}

impl fmt::Display for PinEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinEntryType::Direct => f.write_str("direct"),
            PinEntryType::Recursive => f.write_str("recursive"),
            PinEntryType::Indirect { through: None } => f.write_str("indirect"),
            PinEntryType::Indirect {
                through: Some(parent),
            } => write!(f, "indirect through {parent}"),
        }
    }
}

/// One record produced by [`ls`].
#[derive(Debug, Clone, PartialEq)]
pub struct PinEntry {
    pub pin_type: PinEntryType,
    pub cid: Cid,
    pub metadata: Option<Metadata>,
}

impl PinEntry {
    pub fn new(pin_type: PinEntryType, cid: Cid, metadata: Option<Metadata>) -> Self {
        Self {
            pin_type,
            cid,
            metadata,
        }
    }
}

/// A direct or recursive key as enumerated by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedKey {
    pub cid: Cid,
    pub metadata: Option<Metadata>,
}

/// Options passed through to [`PinSets::indirect_keys`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IndirectKeysOptions {
    /// Stores may stop walking once this passes.
    pub deadline: Option<Instant>,
}

/// A named edge from one object to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Link {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub cid: Cid,
}

impl Link {
    pub fn new(name: impl Into<String>, cid: Cid) -> Self {
        Self {
            name: name.into(),
            cid,
        }
    }
}

/// Read access to the pin sets of an object store.
///
/// Enumeration streams are lazy: no work happens until they are polled,
/// and dropping them releases whatever the store holds for them.
#[async_trait::async_trait]
pub trait PinSets: Send + Sync {
    /// All recursively pinned roots with their metadata.
    fn recursive_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>>;

    /// All directly pinned objects with their metadata.
    fn direct_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>>;

    /// All objects retained only because a recursive root reaches them.
    ///
    /// No parent is reported per object.
    fn indirect_keys(&self, options: IndirectKeysOptions)
    -> BoxStream<'_, anyhow::Result<Cid>>;

    /// Classifies `cid` against `pin_type`.
    ///
    /// For indirect pins the parent is the first recursive root found to
    /// reach `cid`, not every root that does.
    async fn is_pinned_with_type(
        &self,
        cid: Cid,
        pin_type: PinType,
    ) -> anyhow::Result<PinClassification>;

    /// Removes the direct or recursive pin on `cid`. No-op if unpinned.
    async fn unpin(&self, cid: Cid) -> anyhow::Result<()>;
}

/// Child links of stored objects.
#[async_trait::async_trait]
pub trait DagLinks: Send + Sync {
    async fn links(&self, cid: Cid) -> anyhow::Result<Vec<Link>>;
}

/// Write access to a pin-set store.
#[async_trait::async_trait]
pub trait PinWriter: PinSets + DagLinks {
    /// Pins `cid` in `mode`, replacing a pin in the other mode.
    async fn pin(&self, cid: Cid, mode: PinMode, metadata: Option<Metadata>)
    -> anyhow::Result<()>;

    /// Records that `parent` links to `link.cid` under `link.name`.
    async fn add_link(&self, parent: Cid, link: Link) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl<T: PinSets + ?Sized> PinSets for std::sync::Arc<T> {
    fn recursive_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        (**self).recursive_keys()
    }

    fn direct_keys(&self) -> BoxStream<'_, anyhow::Result<PinnedKey>> {
        (**self).direct_keys()
    }

    fn indirect_keys(
        &self,
        options: IndirectKeysOptions,
    ) -> BoxStream<'_, anyhow::Result<Cid>> {
        (**self).indirect_keys(options)
    }

    async fn is_pinned_with_type(
        &self,
        cid: Cid,
        pin_type: PinType,
    ) -> anyhow::Result<PinClassification> {
        (**self).is_pinned_with_type(cid, pin_type).await
    }

    async fn unpin(&self, cid: Cid) -> anyhow::Result<()> {
        (**self).unpin(cid).await
    }
}

#[async_trait::async_trait]
impl<T: DagLinks + ?Sized> DagLinks for std::sync::Arc<T> {
    async fn links(&self, cid: Cid) -> anyhow::Result<Vec<Link>> {
        (**self).links(cid).await
    }
}

#[async_trait::async_trait]
impl<T: PinWriter + ?Sized> PinWriter for std::sync::Arc<T> {
    async fn pin(
        &self,
        cid: Cid,
        mode: PinMode,
        metadata: Option<Metadata>,
    ) -> anyhow::Result<()> {
        (**self).pin(cid, mode, metadata).await
    }

    async fn add_link(&self, parent: Cid, link: Link) -> anyhow::Result<()> {
        (**self).add_link(parent, link).await
    }
}
