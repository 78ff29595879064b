//! CLI command definitions and dispatch.

pub mod check;
pub mod list;
pub mod rm;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ociclient::Registry;

use crate::error::Result;

/// Inspect and prune images in a Docker Registry V2 registry.
#[derive(Parser, Debug)]
#[command(name = "dreg", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// URL of registry [env: REGISTRY] [default: http://localhost:5000]
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Path to docker config file for auth creds [default: ~/.docker/config.json]
    #[arg(long, global = true, value_name = "PATH")]
    pub docker_config: Option<PathBuf>,

    /// Path to a dreg configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that registry supports V2 API
    Check,
    /// List images in registry
    List(list::ListArgs),
    /// Remove images from registry
    #[command(alias = "rmi")]
    Rm(rm::RmArgs),
}

/// Run a command against `registry`, writing results to stdout and
/// per-image warnings to stderr.
pub async fn dispatch<R>(command: &Command, registry: &R, verbose: bool) -> Result<()>
where
    R: Registry + ?Sized,
{
    let mut out = io::stdout();

    match command {
        Command::Check => check::run(registry, &mut out).await,
        Command::List(args) => list::run(registry, args, &mut out).await,
        Command::Rm(args) => {
            let mut err = io::stderr();
            rm::run(registry, &args.images, verbose, &mut out, &mut err)
                .await?
                .into_result()
        }
    }
}
