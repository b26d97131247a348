// SPDX-License-Identifier: MIT OR Apache-2.0
//! `Linebridge` command line.
//!
//! Moves line node trees and pencil materials between scene snapshots and
//! the JSON interchange document:
//! - `export` writes a document from a scene
//! - `list` shows what a document can import
//! - `import` merges a document into a scene

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "linebridge=debug" } else { "linebridge=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting Linebridge v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::run(&cli) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}
