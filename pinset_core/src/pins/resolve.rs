use super::DagLinks;
use crate::Cid;
use anyhow::{Context, anyhow};

/// Turns a user-supplied locator into an identifier.
#[async_trait::async_trait]
pub trait PathResolver: Send + Sync {
    async fn resolve(&self, path: &str) -> anyhow::Result<Cid>;
}

#[async_trait::async_trait]
impl<T: PathResolver + ?Sized> PathResolver for std::sync::Arc<T> {
    async fn resolve(&self, path: &str) -> anyhow::Result<Cid> {
        (**self).resolve(path).await
    }
}

/// Resolves `<cid>`, `/<cid>` and `<cid>/name/...` by following named links.
///
/// The first segment must be an identifier. Namespaced paths such as
/// `/ipfs/<cid>/...` are rejected as invalid identifiers.
#[derive(Debug, Clone)]
pub struct DagPathResolver<L> {
    links: L,
}

impl<L: DagLinks> DagPathResolver<L> {
    pub fn new(links: L) -> Self {
        Self { links }
    }
}

#[async_trait::async_trait]
impl<L: DagLinks> PathResolver for DagPathResolver<L> {
    async fn resolve(&self, path: &str) -> anyhow::Result<Cid> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let root = segments.next().context("empty path")?;
        let mut cid: Cid = root
            .parse()
            .with_context(|| format!("invalid identifier '{root}'"))?;

        for name in segments {
            let links = self.links.links(cid).await?;
            cid = links
                .into_iter()
                .find(|link| link.name == name)
                .map(|link| link.cid)
                .ok_or_else(|| anyhow!("no link named '{name}' under {cid}"))?;
        }
        Ok(cid)
    }
}
