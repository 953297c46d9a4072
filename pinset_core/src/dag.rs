//! Reachability helpers for [`PinSets`](crate::PinSets) implementations.
//!
//! Stores use these to derive indirect pins from their recursive roots.
//! The listing and removal engines never walk the graph themselves.

use crate::pins::{DagLinks, IndirectKeysOptions};
use crate::{Cid, PinError};
use std::collections::{HashSet, VecDeque};
use tokio::time::Instant;

/// Breadth-first walk below `root`, excluding `root` itself.
///
/// Each descendant is visited once; `visit` returning `false` stops the walk.
pub async fn walk_descendants<L, F>(links: &L, root: Cid, mut visit: F) -> anyhow::Result<()>
where
    L: DagLinks + ?Sized,
    F: FnMut(Cid) -> bool,
{
    let mut seen: HashSet<Cid> = HashSet::new();
    let mut queue: VecDeque<Cid> = VecDeque::from([root]);
    seen.insert(root);

    while let Some(cid) = queue.pop_front() {
        for link in links.links(cid).await? {
            if !seen.insert(link.cid) {
                continue;
            }
            if !visit(link.cid) {
                return Ok(());
            }
            queue.push_back(link.cid);
        }
    }
    Ok(())
}

/// Returns the first root in `roots` order that reaches `target`.
pub async fn find_indirect_parent<L>(
    links: &L,
    roots: &[Cid],
    target: Cid,
) -> anyhow::Result<Option<Cid>>
where
    L: DagLinks + ?Sized,
{
    for root in roots {
        let mut found = false;
        walk_descendants(links, *root, |cid| {
            found = cid == target;
            !found
        })
        .await?;
        if found {
            return Ok(Some(*root));
        }
    }
    Ok(None)
}

/// Collects every descendant of `roots` that is not itself a root.
///
/// Each object is reported once, in walk order.
pub async fn collect_indirect<L>(
    links: &L,
    roots: &[Cid],
    options: IndirectKeysOptions,
) -> anyhow::Result<Vec<Cid>>
where
    L: DagLinks + ?Sized,
{
    let recursive: HashSet<Cid> = roots.iter().copied().collect();
    let mut reported: HashSet<Cid> = HashSet::new();
    let mut out = Vec::new();

    for root in roots {
        if options.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(PinError::Timeout.into());
        }
        walk_descendants(links, *root, |cid| {
            if !recursive.contains(&cid) && reported.insert(cid) {
                out.push(cid);
            }
            true
        })
        .await?;
    }
    Ok(out)
}
