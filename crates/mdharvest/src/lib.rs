//! mdharvest - site-scoped documentation scraping library
//!
//! This crate crawls one hop of same-domain links from one or more seed
//! URLs, converts each discovered page to normalized Markdown, and packs
//! the results into size-bounded output files with a generated manifest.
//!
//! ## Pipeline
//!
//! 1. [`discover`](discover::discover) expands a seed page into its
//!    same-domain candidate links (one hop, capped, deduplicated).
//! 2. A [`Converter`] turns each candidate URL into Markdown text. The
//!    default [`HttpConverter`] fetches over HTTP and normalizes HTML;
//!    callers can inject their own converter.
//! 3. The [`Batcher`] routes each converted document: oversized documents
//!    become standalone files, everything else accumulates into batches
//!    sealed under configurable size ceilings.
//! 4. Sealed units are written with collision-safe names from the
//!    [`FilenameResolver`], and an `index.md` manifest maps every output
//!    file back to its source URLs.
//!
//! The whole run is driven by [`Scraper::run`], which returns a
//! [`ScrapeSummary`] of processed/failed page counts and produced units.

pub mod batcher;
pub mod convert;
pub mod converter;
pub mod discover;
mod error;
pub mod filename;
pub mod manifest;
pub mod scrape;

pub use batcher::{BatchPolicy, Batcher, ConvertedDocument, SealedUnit, UnitKind};
pub use converter::{Converter, HttpConverter};
pub use error::{ConvertError, HarvestError};
pub use filename::FilenameResolver;
pub use manifest::{write_manifest, ManifestEntry, MANIFEST_FILENAME};
pub use scrape::{ScrapeOptions, ScrapeSummary, Scraper};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "mdharvest/0.1";
