use anyhow::{Context, Result};
use clap::Subcommand;
use pinset_core::{Cid, DagLinks, Link, PinWriter};
use std::path::PathBuf;

use crate::helpers::CliPinApi;

#[derive(Subcommand)]
pub enum DagCmd {
    /// Record that PARENT links to CHILD under NAME
    Link {
        parent: Cid,
        name: String,
        child: Cid,
    },
    /// Print the named links of an object
    Links { cid: Cid },
    /// Print the identifier of a local file's contents
    Hash { path: PathBuf },
}

pub async fn run_dag(cmd: DagCmd, api: &CliPinApi) -> Result<()> {
    match cmd {
        DagCmd::Link {
            parent,
            name,
            child,
        } => {
            api.pins().add_link(parent, Link::new(name, child)).await?;
        }
        DagCmd::Links { cid } => {
            for link in api.pins().links(cid).await? {
                println!("{} {}", link.name, link.cid);
            }
        }
        DagCmd::Hash { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            println!("{}", Cid::new(&bytes));
        }
    }
    Ok(())
}
