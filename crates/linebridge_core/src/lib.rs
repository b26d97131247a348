// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line node interchange for `Linebridge`.
//!
//! Converts line node trees, pencil materials and node groups of a host
//! [`Scope`] to and from the JSON interchange document.
//!
//! ## Architecture
//!
//! - [`schema`] declares every record type as a static attribute table
//! - [`codec`] maps each semantic attribute type to an encode/decode pair
//! - [`export`] walks the scope and fills a [`Document`]
//! - [`import`] validates a document, collects what the selected roots
//!   depend on and recreates it in two passes
//!
//! Per-entity and per-attribute failures never abort an import; they are
//! collected in the [`ImportReport`].

pub mod codec;
pub mod collect;
pub mod color;
pub mod compat;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod gradation;
pub mod import;
pub mod schema;
pub mod version;

#[cfg(test)]
mod fixtures;

pub use codec::AttributeOverride;
pub use config::{BridgeConfig, ImportSettings};
pub use document::{Document, WireNode};
pub use error::{BridgeError, CodecError, CreationError, Result};
pub use import::{ImportReport, SkippedAttribute};
pub use schema::{AttrType, Schema, SchemaRegistry};
pub use version::FileVersion;

use linebridge_graph::Scope;

/// Export a scope as document text
pub fn export_document(scope: &dyn Scope, config: &BridgeConfig) -> Result<String> {
    export::export(scope, config, None).to_json()
}

/// Export a scope, reading attributes through `overrides` first
pub fn export_document_with(
    scope: &dyn Scope,
    config: &BridgeConfig,
    overrides: AttributeOverride<'_>,
) -> Result<String> {
    export::export(scope, config, Some(overrides)).to_json()
}

/// `(wire id, name)` of the importable lines and materials of a document.
/// Unreadable documents list nothing.
pub fn enumerate_importable(text: &str) -> (Vec<(String, String)>, Vec<(String, String)>) {
    match Document::from_json(text) {
        Ok(document) => (document.line_entries(), document.material_entries()),
        Err(error) => {
            tracing::debug!(%error, "Nothing to enumerate");
            (Vec::new(), Vec::new())
        }
    }
}

/// Parse document text and import it into `tree` of a scope
pub fn import_document(
    text: &str,
    scope: &mut dyn Scope,
    tree: &str,
    settings: &ImportSettings,
    config: &BridgeConfig,
) -> Result<ImportReport> {
    let document = Document::from_json(text)?;
    import::import(&document, scope, tree, settings, config)
}
