// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use linebridge_core::ImportSettings;
use std::path::PathBuf;

/// Tree imported lines go into when none is named
pub const DEFAULT_TREE: &str = "Line Node Tree";

#[derive(Debug, Parser)]
#[command(name = "linebridge", version, about = "Exchange line node trees and pencil materials as JSON")]
pub struct Cli {
    /// Log every entity the engines touch
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bridge configuration (RON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a scene snapshot as an interchange document
    Export {
        /// Scene snapshot (RON)
        #[arg(long)]
        scene: PathBuf,
        /// Output document, stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the importable lines and materials of a document
    List {
        /// Interchange document
        document: PathBuf,
    },

    /// Import a document into a scene snapshot
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Interchange document
    pub document: PathBuf,

    /// Scene snapshot to import into, created when missing
    #[arg(long)]
    pub scene: PathBuf,

    /// Line node tree receiving the lines
    #[arg(long, default_value = DEFAULT_TREE)]
    pub tree: String,

    /// Where to write the result, the input scene when omitted
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Keep existing entities named like the imported ones
    #[arg(long)]
    pub merge: bool,

    /// Length scale, the document's when omitted
    #[arg(long)]
    pub scale: Option<f64>,

    /// Import only this line (repeatable)
    #[arg(long = "line", value_name = "ID")]
    pub lines: Vec<String>,

    /// Import only this material (repeatable)
    #[arg(long = "material", value_name = "ID")]
    pub materials: Vec<String>,

    /// Import no lines
    #[arg(long, conflicts_with = "lines")]
    pub no_lines: bool,

    /// Import no materials
    #[arg(long, conflicts_with = "materials")]
    pub no_materials: bool,

    /// Follow specific brushes whose feature is switched off
    #[arg(long)]
    pub import_disabled_brushes: bool,

    /// Follow reductions that are switched off
    #[arg(long)]
    pub import_disabled_reductions: bool,
}

fn selection(ids: &[String], none: bool) -> Option<Vec<String>> {
    if none {
        Some(Vec::new())
    } else if ids.is_empty() {
        None
    } else {
        Some(ids.to_vec())
    }
}

impl ImportArgs {
    /// Engine options for these arguments
    pub fn settings(&self) -> ImportSettings {
        ImportSettings {
            line_ids: selection(&self.lines, self.no_lines),
            material_ids: selection(&self.materials, self.no_materials),
            overwrite: !self.merge,
            scale_factor: self.scale,
            import_disabled_brush_settings: self.import_disabled_brushes,
            import_disabled_reduction_settings: self.import_disabled_reductions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_args(args: &[&str]) -> ImportArgs {
        let cli = Cli::try_parse_from(["linebridge", "import", "doc.json", "--scene", "s.ron"].iter().chain(args).copied())
            .unwrap();
        match cli.command {
            Command::Import(args) => args,
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn test_import_defaults() {
        let args = import_args(&[]);
        assert_eq!(args.tree, DEFAULT_TREE);
        let settings = args.settings();
        assert!(settings.line_ids.is_none());
        assert!(settings.material_ids.is_none());
        assert!(settings.overwrite);
        assert!(!settings.import_disabled_brush_settings);
    }

    #[test]
    fn test_import_selection() {
        let settings = import_args(&["--line", "T/A", "--line", "T/B", "--no-materials", "--merge", "--scale", "0.5"])
            .settings();
        assert_eq!(settings.line_ids, Some(vec!["T/A".to_string(), "T/B".to_string()]));
        assert_eq!(settings.material_ids, Some(Vec::new()));
        assert!(!settings.overwrite);
        assert_eq!(settings.scale_factor, Some(0.5));
    }

    #[test]
    fn test_conflicting_selection_is_rejected() {
        let result = Cli::try_parse_from(["linebridge", "import", "d.json", "--scene", "s.ron", "--no-lines", "--line", "x"]);
        assert!(result.is_err());
    }
}
