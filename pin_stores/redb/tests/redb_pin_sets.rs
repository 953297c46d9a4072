use futures::TryStreamExt;
use pinset_core::testutil::PinSetsTests;
use pinset_core::{
    Cid, DagLinks, IndirectKeysOptions, Link, MetaValue, Metadata, PinMode, PinReason, PinSets,
    PinType, PinWriter,
};
use pinset_store_redb::{RedbPinSets, RedbPinSetsConfig};

#[tokio::test]
async fn redb_pin_sets_conformance() {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbPinSets::open(dir.path()).unwrap();
    PinSetsTests::new(&store).run_all().await.unwrap();
}

#[tokio::test]
async fn pins_and_links_survive_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let root = Cid::new(b"root");
    let child = Cid::new(b"child");
    let mut meta = Metadata::new();
    meta.insert("tag".into(), MetaValue::from("x"));

    {
        let store = RedbPinSets::open(dir.path())?;
        store.add_link(root, Link::new("child", child)).await?;
        store
            .pin(root, PinMode::Recursive, Some(meta.clone()))
            .await?;
    }

    let store = RedbPinSets::create(RedbPinSetsConfig {
        path: dir.path().to_string_lossy().into(),
    })?;
    assert_eq!(store.links(root).await?, vec![Link::new("child", child)]);

    let roots: Vec<_> = store.recursive_keys().try_collect().await?;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].cid, root);
    assert_eq!(roots[0].metadata, Some(meta));

    let indirect: Vec<Cid> = store
        .indirect_keys(IndirectKeysOptions::default())
        .try_collect()
        .await?;
    assert_eq!(indirect, vec![child]);

    let c = store.is_pinned_with_type(child, PinType::All).await?;
    assert_eq!(c.reason, Some(PinReason::Indirect { parent: root }));
    Ok(())
}

#[tokio::test]
async fn empty_store_enumerates_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = RedbPinSets::open(dir.path().join("nested").join("pins"))?;
    assert!(store.direct_keys().try_next().await?.is_none());
    assert!(store.recursive_keys().try_next().await?.is_none());
    assert!(
        store
            .indirect_keys(IndirectKeysOptions::default())
            .try_next()
            .await?
            .is_none()
    );
    Ok(())
}
