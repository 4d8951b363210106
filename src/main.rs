//! asmdoc — build a unified documentation model from compiled-assembly
//! metadata and XML doc-comment files.
//!
//! The pipeline is a fixed sequence: load every configured source group,
//! reconcile metadata with documentation (1:1 by declared assembly name),
//! populate the model graph and registry, register topics, resolve inherited
//! documentation, then emit the model dump for a downstream renderer.
//! Fatal diagnostics are batched per phase; the process exits non-zero if
//! any occurred.

mod config;
mod diag;
mod dump;
mod graph;
mod inherit;
mod loader;
mod model;
mod registry;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use diag::Diagnostics;
use loader::metadata::ManifestReader;
use loader::reconcile::{self, AssemblyNameMatcher};
use registry::MemberRegistry;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "asmdoc",
    about = "Build a documentation model from assembly metadata and XML doc-comment files"
)]
struct Cli {
    /// Configuration file listing source groups (JSON).
    config: PathBuf,

    /// Write the model dump to a file instead of stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Validate and reconcile sources without emitting the model dump.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let code = run(&cli)?;
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<i32> {
    let mut diag = Diagnostics::new();
    let config = Config::load(&cli.config, &mut diag)?;

    let loaded = loader::load_all(&config, &ManifestReader, &mut diag);
    let paired = reconcile::pair(loaded, &AssemblyNameMatcher, &mut diag);

    // Loading and reconciliation batch their failures; halt only once every
    // source has been checked.
    if diag.has_fatal() {
        eprintln!(
            "asmdoc: {} fatal error(s), no model produced",
            diag.fatal_count()
        );
        return Ok(1);
    }

    let mut registry = MemberRegistry::new();
    graph::build(paired, &mut registry, &mut diag);
    for topic in config.topics {
        registry.register_topic(topic, &mut diag);
    }
    inherit::resolve(&mut registry, &mut diag);

    if !cli.check {
        let output = dump::render(&registry)?;
        match &cli.output {
            Some(path) => fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => print!("{output}"),
        }
    }

    Ok(if diag.has_fatal() { 1 } else { 0 })
}
