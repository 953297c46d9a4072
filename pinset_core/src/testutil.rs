//! Test utilities for `PinSets` implementations.
//!
//! This module provides a test suite that can be run against any
//! `PinWriter` implementation to verify the store contract the listing
//! and removal engines rely on.
//!
//! # Usage
//!
//! In your store crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! pinset_core = { workspace = true, features = ["testutil"] }
//! ```
//!
//! In your test file:
//!
//! ```ignore
//! use pinset_core::testutil::PinSetsTests;
//!
//! #[tokio::test]
//! async fn test_my_store() {
//!     let store = MyPinSets::new(...);
//!     PinSetsTests::new(&store).run_all().await.unwrap();
//! }
//! ```

use crate::pins::{IndirectKeysOptions, Link, PinMode, PinReason, PinType, PinWriter, PinnedKey};
use crate::{Cid, MetaValue, Metadata};
use futures::TryStreamExt;
use rand::Rng;
use std::collections::HashSet;

/// Test suite for `PinWriter` implementations.
///
/// Every test works on freshly generated random identifiers, so the
/// suite can run against a store that already holds data.
pub struct PinSetsTests<'a, S> {
    store: &'a S,
}

impl<'a, S: PinWriter> PinSetsTests<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn random_cid(&self) -> Cid {
        Cid::from_bytes(rand::rng().random())
    }

    /// Run all tests.
    pub async fn run_all(&self) -> anyhow::Result<()> {
        self.test_direct_pin().await?;
        self.test_recursive_pin_with_metadata().await?;
        self.test_modes_are_exclusive().await?;
        self.test_indirect_attribution().await?;
        self.test_type_filters().await?;
        self.test_indirect_keys().await?;
        self.test_unpin().await?;
        Ok(())
    }

    async fn recursive_set(&self) -> anyhow::Result<Vec<PinnedKey>> {
        self.store.recursive_keys().try_collect().await
    }

    async fn direct_set(&self) -> anyhow::Result<Vec<PinnedKey>> {
        self.store.direct_keys().try_collect().await
    }

    /// A direct pin is classified and enumerated as direct.
    pub async fn test_direct_pin(&self) -> anyhow::Result<()> {
        let cid = self.random_cid();
        self.store.pin(cid, PinMode::Direct, None).await?;

        let c = self.store.is_pinned_with_type(cid, PinType::All).await?;
        assert!(c.pinned);
        assert_eq!(c.reason, Some(PinReason::Direct));

        let direct = self.direct_set().await?;
        assert!(direct.iter().any(|k| k.cid == cid && k.metadata.is_none()));
        assert!(!self.recursive_set().await?.iter().any(|k| k.cid == cid));
        Ok(())
    }

    /// Recursive pins keep their metadata through classification and enumeration.
    pub async fn test_recursive_pin_with_metadata(&self) -> anyhow::Result<()> {
        let cid = self.random_cid();
        let mut meta = Metadata::new();
        meta.insert("tag".into(), MetaValue::from("x"));
        meta.insert("n".into(), MetaValue::Int(7));
        self.store
            .pin(cid, PinMode::Recursive, Some(meta.clone()))
            .await?;

        let c = self.store.is_pinned_with_type(cid, PinType::Recursive).await?;
        assert_eq!(c.reason, Some(PinReason::Recursive));
        assert_eq!(c.metadata.as_ref(), Some(&meta));

        let recursive = self.recursive_set().await?;
        let key = recursive
            .iter()
            .find(|k| k.cid == cid)
            .expect("recursive root is enumerated");
        assert_eq!(key.metadata.as_ref(), Some(&meta));
        Ok(())
    }

    /// Pinning in one mode replaces a pin in the other.
    pub async fn test_modes_are_exclusive(&self) -> anyhow::Result<()> {
        let cid = self.random_cid();
        self.store.pin(cid, PinMode::Direct, None).await?;
        self.store.pin(cid, PinMode::Recursive, None).await?;
        assert!(!self.direct_set().await?.iter().any(|k| k.cid == cid));
        assert!(self.recursive_set().await?.iter().any(|k| k.cid == cid));

        self.store.pin(cid, PinMode::Direct, None).await?;
        assert!(self.direct_set().await?.iter().any(|k| k.cid == cid));
        assert!(!self.recursive_set().await?.iter().any(|k| k.cid == cid));
        Ok(())
    }

    /// Descendants of a recursive root are indirect under that root.
    pub async fn test_indirect_attribution(&self) -> anyhow::Result<()> {
        let root = self.random_cid();
        let mid = self.random_cid();
        let leaf = self.random_cid();
        self.store.add_link(root, Link::new("mid", mid)).await?;
        self.store.add_link(mid, Link::new("leaf", leaf)).await?;
        self.store.pin(root, PinMode::Recursive, None).await?;

        for cid in [mid, leaf] {
            let c = self.store.is_pinned_with_type(cid, PinType::All).await?;
            assert!(c.pinned);
            assert_eq!(c.reason, Some(PinReason::Indirect { parent: root }));
            assert_eq!(c.metadata, None);
        }

        let stray = self.random_cid();
        let c = self.store.is_pinned_with_type(stray, PinType::All).await?;
        assert!(!c.pinned);
        Ok(())
    }

    /// Narrow type filters only look at their own set.
    pub async fn test_type_filters(&self) -> anyhow::Result<()> {
        let root = self.random_cid();
        let child = self.random_cid();
        self.store.add_link(root, Link::new("child", child)).await?;
        self.store.pin(root, PinMode::Recursive, None).await?;
        self.store.pin(child, PinMode::Direct, None).await?;

        let as_direct = self.store.is_pinned_with_type(root, PinType::Direct).await?;
        assert!(!as_direct.pinned);
        let as_recursive = self
            .store
            .is_pinned_with_type(child, PinType::Recursive)
            .await?;
        assert!(!as_recursive.pinned);

        // `all` prefers the stored direct pin over the derived indirect one
        let all = self.store.is_pinned_with_type(child, PinType::All).await?;
        assert_eq!(all.reason, Some(PinReason::Direct));
        let indirect = self
            .store
            .is_pinned_with_type(child, PinType::Indirect)
            .await?;
        assert_eq!(indirect.reason, Some(PinReason::Indirect { parent: root }));
        Ok(())
    }

    /// Indirect enumeration excludes recursive roots and reports each object once.
    pub async fn test_indirect_keys(&self) -> anyhow::Result<()> {
        let a = self.random_cid();
        let b = self.random_cid();
        let shared = self.random_cid();
        self.store.add_link(a, Link::new("shared", shared)).await?;
        self.store.add_link(b, Link::new("shared", shared)).await?;
        self.store.add_link(a, Link::new("b", b)).await?;
        self.store.pin(a, PinMode::Recursive, None).await?;
        self.store.pin(b, PinMode::Recursive, None).await?;

        let indirect: Vec<Cid> = self
            .store
            .indirect_keys(IndirectKeysOptions::default())
            .try_collect()
            .await?;
        assert_eq!(indirect.iter().filter(|c| **c == shared).count(), 1);
        assert!(!indirect.contains(&a));
        assert!(!indirect.contains(&b));

        let unique: HashSet<&Cid> = indirect.iter().collect();
        assert_eq!(unique.len(), indirect.len());
        Ok(())
    }

    /// Unpinning a root releases its descendants; unpinning twice is a no-op.
    pub async fn test_unpin(&self) -> anyhow::Result<()> {
        let root = self.random_cid();
        let child = self.random_cid();
        self.store.add_link(root, Link::new("child", child)).await?;
        self.store.pin(root, PinMode::Recursive, None).await?;

        self.store.unpin(root).await?;
        assert!(!self.store.is_pinned_with_type(root, PinType::All).await?.pinned);
        assert!(!self.store.is_pinned_with_type(child, PinType::All).await?.pinned);

        self.store.unpin(root).await?;

        let direct = self.random_cid();
        self.store.pin(direct, PinMode::Direct, None).await?;
        self.store.unpin(direct).await?;
        assert!(!self.direct_set().await?.iter().any(|k| k.cid == direct));
        Ok(())
    }
}
