use anyhow::Result;
use clap::{ArgAction, Subcommand};
use futures::TryStreamExt;
use pinset_core::{ListOptions, PinMode, PinType, RemoveOptions, normalise};
use std::io::Write;

use crate::config::PinConfig;
use crate::helpers::{CliPinApi, format_entry, parse_metadata};

#[derive(Subcommand)]
pub enum PinCmd {
    /// List pinned objects, or check that the given paths are pinned
    Ls {
        /// direct, recursive, indirect or all
        #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "all")]
        pin_type: String,
        /// Paths to check; lists everything when omitted
        paths: Vec<String>,
    },
    /// Remove pins; stops at the first path that cannot be unpinned
    Rm {
        /// Allow removing recursive pins together with what they retain
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        recursive: bool,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Pin objects, recursively unless --direct is given
    Add {
        #[arg(long, action = ArgAction::SetTrue)]
        direct: bool,
        /// Metadata entry as key=value, may be repeated
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

pub async fn run_pin(cmd: PinCmd, api: &CliPinApi, pin_config: &PinConfig) -> Result<()> {
    let mut out = std::io::stdout().lock();
    match cmd {
        PinCmd::Ls { pin_type, paths } => {
            let pin_type: PinType = pin_type.parse()?;
            let mut options = ListOptions::default().with_type(pin_type);
            if !paths.is_empty() {
                options = options.with_paths(normalise(paths));
            }
            if let Some(timeout) = pin_config.timeout() {
                options = options.with_timeout(timeout);
            }
            let mut entries = api.ls(options);
            while let Some(entry) = entries.try_next().await? {
                writeln!(out, "{}", format_entry(&entry))?;
            }
        }
        PinCmd::Rm { recursive, paths } => {
            let source = normalise(paths.into_iter().map(move |path| (path, recursive)));
            let options = RemoveOptions {
                timeout: pin_config.timeout(),
            };
            let mut removed = api.rm_all(source, options);
            while let Some(cid) = removed.try_next().await? {
                writeln!(out, "unpinned {cid}")?;
            }
        }
        PinCmd::Add {
            direct,
            meta,
            paths,
        } => {
            let mode = if direct {
                PinMode::Direct
            } else {
                PinMode::Recursive
            };
            let metadata = parse_metadata(&meta)?;
            let mut added = api.add_all(normalise(paths), mode, metadata);
            while let Some(cid) = added.try_next().await? {
                writeln!(out, "pinned {cid} {}", PinType::from(mode))?;
            }
        }
    }
    Ok(())
}
