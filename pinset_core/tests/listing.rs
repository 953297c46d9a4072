//! Listing behavior over a small pin set:
//! direct `a` tagged `x`, recursive `b`, and `c` retained only by `b`.

mod common;

use common::{scenario, tag_x};
use futures::{StreamExt, TryStreamExt};
use pinset_core::{
    ListOptions, PinEntry, PinEntryType, PinError, PinMode, PinType, PinWriter, ls, normalise,
};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn unrestricted_listing_reports_groups_in_order() {
    let s = scenario().await;
    let entries: Vec<PinEntry> = ls(&*s.store, &s.resolver, ListOptions::default())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(
        entries,
        vec![
            PinEntry::new(PinEntryType::Recursive, s.b, None),
            PinEntry::new(PinEntryType::Indirect { through: None }, s.c, None),
            PinEntry::new(PinEntryType::Direct, s.a, Some(tag_x())),
        ]
    );
    assert_eq!(entries[1].pin_type.to_string(), "indirect");
}

#[tokio::test]
async fn type_filter_keeps_only_its_group() {
    let s = scenario().await;
    for (pin_type, expected) in [
        (PinType::Recursive, vec![s.b]),
        (PinType::Indirect, vec![s.c]),
        (PinType::Direct, vec![s.a]),
    ] {
        let cids: Vec<_> = ls(
            &*s.store,
            &s.resolver,
            ListOptions::default().with_type(pin_type),
        )
        .map_ok(|entry| entry.cid)
        .try_collect()
        .await
        .unwrap();
        assert_eq!(cids, expected, "filter {pin_type}");
    }
}

#[tokio::test]
async fn recursive_entries_carry_their_metadata() {
    let s = scenario().await;
    s.store
        .inner
        .pin(s.b, PinMode::Recursive, Some(tag_x()))
        .await
        .unwrap();

    let entries: Vec<PinEntry> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_type(PinType::Recursive),
    )
    .try_collect()
    .await
    .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pin_type, PinEntryType::Recursive);
    assert_eq!(entries[0].metadata, Some(tag_x()));
}

#[tokio::test]
async fn path_listing_attributes_indirect_parent() {
    let s = scenario().await;
    let paths = normalise([format!("{}/c", s.b)]);
    let entries: Vec<PinEntry> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_paths(paths),
    )
    .try_collect()
    .await
    .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].cid, s.c);
    assert_eq!(entries[0].metadata, None);
    assert_eq!(
        entries[0].pin_type.to_string(),
        format!("indirect through {}", s.b)
    );
}

#[tokio::test]
async fn path_listing_yields_one_entry_per_path_in_order() {
    let s = scenario().await;
    let paths = normalise([s.a, s.b, s.c]);
    let entries: Vec<PinEntry> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_paths(paths),
    )
    .try_collect()
    .await
    .unwrap();

    assert_eq!(
        entries,
        vec![
            PinEntry::new(PinEntryType::Direct, s.a, Some(tag_x())),
            PinEntry::new(PinEntryType::Recursive, s.b, None),
            PinEntry::new(PinEntryType::Indirect { through: Some(s.b) }, s.c, None),
        ]
    );
}

#[tokio::test]
async fn unpinned_path_ends_listing_after_earlier_entries() {
    let s = scenario().await;
    let stray = pinset_core::Cid::new(b"not pinned");
    let stray_path = stray.to_string();
    let paths = normalise([s.a.to_string(), stray_path.clone(), s.b.to_string()]);

    let results: Vec<_> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_paths(paths),
    )
    .collect()
    .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().cid, s.a);
    assert!(matches!(
        &results[1],
        Err(PinError::PathNotPinned { path }) if *path == stray_path
    ));
    // `b` was never queried
    assert_eq!(s.store.queries(), 2);
}

#[tokio::test]
async fn path_must_match_requested_type() {
    let s = scenario().await;
    let paths = normalise([s.c]);
    let err = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default()
            .with_type(PinType::Direct)
            .with_paths(paths),
    )
    .try_collect::<Vec<_>>()
    .await
    .unwrap_err();
    assert!(matches!(err, PinError::PathNotPinned { .. }));
}

#[tokio::test]
async fn empty_path_list_is_no_match() {
    let s = scenario().await;
    let paths = normalise(Vec::<String>::new());
    let results: Vec<_> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_paths(paths),
    )
    .collect()
    .await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(PinError::NoMatch)));
}

#[tokio::test]
async fn unresolvable_path_is_resolution_error() {
    let s = scenario().await;
    let paths = normalise([format!("{}/missing", s.b)]);
    let err = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_paths(paths),
    )
    .try_collect::<Vec<_>>()
    .await
    .unwrap_err();
    assert!(matches!(err, PinError::Resolution { .. }));
    assert_eq!(s.store.queries(), 0);
}

#[test]
fn textual_type_is_validated_before_listing() {
    assert!(matches!(
        "bogus".parse::<PinType>(),
        Err(PinError::InvalidPinType(_))
    ));
    assert_eq!("DIRECT".parse::<PinType>().unwrap(), PinType::Direct);
}

#[tokio::test]
async fn later_groups_are_not_opened_when_abandoned() {
    let s = scenario().await;
    let mut entries = ls(&*s.store, &s.resolver, ListOptions::default());
    let first = entries.try_next().await.unwrap().unwrap();
    assert_eq!(first.cid, s.b);
    drop(entries);
    assert_eq!(s.store.direct_opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn listing_reflects_store_state_at_call_time() {
    let s = scenario().await;
    s.store.inner.pin(s.c, PinMode::Direct, None).await.unwrap();
    let direct: Vec<_> = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default().with_type(PinType::Direct),
    )
    .map_ok(|entry| entry.cid)
    .try_collect()
    .await
    .unwrap();
    let mut expected = vec![s.a, s.c];
    expected.sort();
    assert_eq!(direct, expected);
}

#[tokio::test]
async fn store_side_deadline_is_reported_as_timeout() {
    let s = scenario().await;
    let err = ls(
        &*s.store,
        &s.resolver,
        ListOptions::default()
            .with_type(PinType::Indirect)
            .with_timeout(std::time::Duration::ZERO),
    )
    .try_collect::<Vec<_>>()
    .await
    .unwrap_err();
    assert!(matches!(err, PinError::Timeout), "{err:?}");
}
