//! Manifest generation
//!
//! The manifest is a human-readable `index.md` mapping every produced
//! output file back to the source URLs it contains. It is the entry
//! point a downstream ingestion step uses to walk the corpus. Only
//! successfully converted and sealed content appears in it.

use crate::batcher::SealedUnit;
use crate::error::HarvestError;
use chrono::Local;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use url::Url;

/// Fixed manifest filename within the output directory
pub const MANIFEST_FILENAME: &str = "index.md";

/// One sealed output unit as recorded in the manifest
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// On-disk filename of the unit
    pub filename: String,
    /// "batch" or "individual"
    pub kind: String,
    /// Contributing source URLs, in merge order
    pub sources: Vec<String>,
}

impl ManifestEntry {
    /// Record a sealed unit under its resolved filename
    pub fn from_unit(unit: &SealedUnit, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind: unit.kind_label().to_string(),
            sources: unit.sources.iter().map(|u| u.to_string()).collect(),
        }
    }
}

/// Write the run manifest, once, after all units are sealed
pub fn write_manifest(
    output_dir: &Path,
    seeds: &[Url],
    entries: &[ManifestEntry],
) -> Result<PathBuf, HarvestError> {
    let path = output_dir.join(MANIFEST_FILENAME);
    let body = render_manifest(seeds, entries);
    std::fs::write(&path, body).map_err(|source| HarvestError::WriteManifest {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn render_manifest(seeds: &[Url], entries: &[ManifestEntry]) -> String {
    let title = match seeds {
        [only] => only.host_str().unwrap_or("scrape").to_string(),
        _ => "multiple sites".to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "# Scrape Index - {title}\n");
    let _ = writeln!(out, "**Date:** {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "**Seed URLs:**");
    for seed in seeds {
        let _ = writeln!(out, "  - {seed}");
    }
    let _ = writeln!(out, "\n**Total units:** {}\n", entries.len());
    let _ = writeln!(out, "## Generated Files\n");

    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(out, "{}. **{}** ({})", i + 1, entry.filename, entry.kind);
        for source in &entry.sources {
            let _ = writeln!(out, "   - {source}");
        }
    }

    out
}
