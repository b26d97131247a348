// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::cli::{Cli, Command, ImportArgs};
use anyhow::{Context, Result};
use linebridge_core::{BridgeConfig, ImportReport};
use linebridge_graph::Scene;
use std::io::{self, Write};
use std::path::Path;

/// Run the parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();
    match &cli.command {
        Command::Export { scene, out } => export(scene, out.as_deref(), &config, &mut stdout),
        Command::List { document } => list(document, &mut stdout),
        Command::Import(args) => import(args, &config, &mut stdout),
    }
}

fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    let Some(path) = path else {
        return Ok(BridgeConfig::default());
    };
    let config = BridgeConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

fn load_scene(path: &Path) -> Result<Scene> {
    Scene::load(path).with_context(|| format!("Failed to load scene {}", path.display()))
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read document {}", path.display()))
}

fn export(scene: &Path, out: Option<&Path>, config: &BridgeConfig, stdout: &mut impl Write) -> Result<()> {
    let scene = load_scene(scene)?;
    let text = linebridge_core::export_document(&scene, config)?;
    match out {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote document");
        }
        None => writeln!(stdout, "{text}")?,
    }
    Ok(())
}

fn list(document: &Path, stdout: &mut impl Write) -> Result<()> {
    let text = read_document(document)?;
    let (lines, materials) = linebridge_core::enumerate_importable(&text);
    for (title, entries) in [("Lines", lines), ("Materials", materials)] {
        writeln!(stdout, "{title}:")?;
        for (id, name) in entries {
            writeln!(stdout, "  {id}\t{name}")?;
        }
    }
    Ok(())
}

fn import(args: &ImportArgs, config: &BridgeConfig, stdout: &mut impl Write) -> Result<()> {
    let text = read_document(&args.document)?;
    let mut scene = if args.scene.exists() {
        load_scene(&args.scene)?
    } else {
        tracing::info!(path = %args.scene.display(), "Scene not found, starting empty");
        Scene::new()
    };

    let report = linebridge_core::import_document(&text, &mut scene, &args.tree, &args.settings(), config)
        .with_context(|| format!("Failed to import {}", args.document.display()))?;

    let out = args.out.as_deref().unwrap_or(&args.scene);
    scene
        .save(out)
        .with_context(|| format!("Failed to save scene {}", out.display()))?;
    write_report(&report, stdout)?;
    Ok(())
}

fn write_report(report: &ImportReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Created {} entities", report.created.len())?;
    if report.is_clean() {
        return Ok(());
    }
    writeln!(out, "Skipped records:")?;
    for (id, error) in &report.skipped_nodes {
        writeln!(out, "  {id}: {error}")?;
    }
    writeln!(out, "Skipped attributes:")?;
    for skipped in &report.skipped_attributes {
        writeln!(out, "  {}.{}: {}", skipped.id, skipped.attribute, skipped.error)?;
    }
    Ok(())
}
