//! rtpub - runtime release publisher CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rtpub_cli::cmd;
use rtpub_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; -v only raises the default
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.resolve_config()?;

    match cli.command {
        Commands::Generate { output } => cmd::generate::generate(&config, output.as_deref()),
        Commands::Publish {
            runtime,
            versions,
            tag,
            downloads,
            checksums_verified,
            signatures_verified,
            files,
        } => cmd::publish::publish(
            &config,
            cmd::publish::PublishArgs {
                runtime,
                versions,
                tag,
                downloads,
                checksums_verified,
                signatures_verified,
                files,
            },
        ),
        Commands::List => cmd::list::list(&config),
        Commands::Inspect { tag } => cmd::inspect::inspect(&config, &tag),
    }
}
