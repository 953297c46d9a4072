use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;

mod cmd;
mod config;
mod helpers;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// which pinset node config this command should use
    #[arg(short, long, value_name = "NAME", default_value = "local")]
    node: String,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the node's config
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// List, add and remove pins
    Pin {
        #[command(subcommand)]
        cmd: cmd::PinCmd,
    },
    /// Record and inspect object links
    Dag {
        #[command(subcommand)]
        cmd: cmd::DagCmd,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // Configs live under ~/.config/pinset/<node>.toml,
    // pin databases under ~/.local/share/pinset/<node>/
    let dirs = ProjectDirs::from("", "", "pinset")
        .context("failed to determine config directory path")?;

    let node_config_file = dirs.config_dir().join(&cli.node).with_extension("toml");
    let node_data_dir = dirs.data_dir().join(&cli.node);

    cmd::run_command(node_config_file, &node_data_dir, cli.cmd).await
}
