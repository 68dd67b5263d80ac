//! Scrape orchestration
//!
//! Composes discovery, conversion, batching, filename resolution, and
//! manifest writing into one run. Fetch/convert runs on a bounded worker
//! pool; the batcher is driven by a single consumer in discovery order
//! (`buffered` yields results in input order even when fetches complete
//! out of order), so batching decisions stay sequentially consistent and
//! the manifest reflects discovery order.

use crate::batcher::{BatchPolicy, Batcher, ConvertedDocument, SealedUnit};
use crate::converter::{Converter, HttpConverter};
use crate::discover::discover;
use crate::error::HarvestError;
use crate::filename::FilenameResolver;
use crate::manifest::{write_manifest, ManifestEntry};
use crate::DEFAULT_USER_AGENT;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Default ceiling on pages converted in one run
pub const DEFAULT_MAX_PAGES: usize = 100;
/// Default number of concurrent fetch/convert workers
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Configuration for one scrape run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Directory receiving output files and the manifest
    pub output_dir: PathBuf,
    /// Page cap, applied per seed discovery and to the combined candidate set
    pub max_pages: usize,
    /// Fetch/convert worker count
    pub concurrency: usize,
    /// User-Agent for discovery and the default converter
    pub user_agent: String,
    /// Batch sealing thresholds
    pub policy: BatchPolicy,
}

impl ScrapeOptions {
    /// Options with defaults, writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            policy: BatchPolicy::default(),
        }
    }

    /// Set the page cap
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the worker count
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the User-Agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the batch policy
    pub fn policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Outcome of a scrape run
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSummary {
    /// Pages successfully converted and routed into output units
    pub processed: usize,
    /// Pages skipped after a conversion failure
    pub failed: usize,
    /// Sealed batch files
    pub batches: usize,
    /// Sealed standalone files
    pub standalones: usize,
    /// Where the corpus was written
    pub output_dir: PathBuf,
    /// Manifest path, absent when nothing was extracted
    pub manifest: Option<PathBuf>,
}

impl ScrapeSummary {
    /// Total output units produced
    pub fn units(&self) -> usize {
        self.batches + self.standalones
    }

    /// True when every candidate failed and no corpus was produced
    pub fn nothing_extracted(&self) -> bool {
        self.processed == 0
    }
}

/// Drives a whole scrape run from seeds to manifest
pub struct Scraper {
    converter: Arc<dyn Converter>,
    options: ScrapeOptions,
}

impl Scraper {
    /// Scraper with the default [`HttpConverter`]
    pub fn new(options: ScrapeOptions) -> Self {
        let converter = Arc::new(HttpConverter::with_user_agent(&options.user_agent));
        Self { converter, options }
    }

    /// Scraper with an injected converter
    pub fn with_converter(options: ScrapeOptions, converter: Arc<dyn Converter>) -> Self {
        Self { converter, options }
    }

    /// Run the scrape to completion
    ///
    /// Conversion failures are logged and skipped; discovery failures
    /// degrade each seed to itself. Filesystem failures abort the run.
    /// There is no retry and no cancellation of an in-flight run.
    pub async fn run(&self, seeds: &[String]) -> Result<ScrapeSummary, HarvestError> {
        let seeds = parse_seeds(seeds)?;

        std::fs::create_dir_all(&self.options.output_dir).map_err(|source| {
            HarvestError::CreateOutputDir {
                path: self.options.output_dir.clone(),
                source,
            }
        })?;

        // One hop of discovery per seed, deduplicated across seeds,
        // bounded by the page cap.
        let mut candidates: Vec<Url> = Vec::new();
        for seed in &seeds {
            for link in discover(seed, self.options.max_pages, &self.options.user_agent).await {
                if !candidates.iter().any(|c| c.as_str() == link.as_str()) {
                    candidates.push(link);
                }
            }
        }
        candidates.truncate(self.options.max_pages);
        info!(candidates = candidates.len(), seeds = seeds.len(), "starting conversion");

        let mut batcher = Batcher::new(self.options.policy);
        let mut resolver = FilenameResolver::new(&self.options.output_dir);
        let mut entries: Vec<ManifestEntry> = Vec::new();
        let mut processed = 0usize;
        let mut failed = 0usize;

        let converter = Arc::clone(&self.converter);
        let mut results = stream::iter(candidates)
            .map(|url| {
                let converter = Arc::clone(&converter);
                async move {
                    let result = converter.convert(url.as_str()).await;
                    (url, result)
                }
            })
            .buffered(self.options.concurrency.max(1));

        while let Some((url, result)) = results.next().await {
            match result {
                Ok(markdown) => {
                    processed += 1;
                    if let Some(unit) = batcher.push(ConvertedDocument::new(url, markdown)) {
                        entries.push(self.write_unit(&mut resolver, &unit)?);
                    }
                }
                Err(err) => {
                    failed += 1;
                    warn!(url = %url, error = %err, "conversion failed, skipping");
                }
            }
        }

        if let Some(unit) = batcher.finish() {
            entries.push(self.write_unit(&mut resolver, &unit)?);
        }

        let manifest = if processed > 0 {
            Some(write_manifest(&self.options.output_dir, &seeds, &entries)?)
        } else {
            None
        };

        let batches = entries.iter().filter(|e| e.kind == "batch").count();
        let summary = ScrapeSummary {
            processed,
            failed,
            batches,
            standalones: entries.len() - batches,
            output_dir: self.options.output_dir.clone(),
            manifest,
        };
        info!(
            processed = summary.processed,
            failed = summary.failed,
            units = summary.units(),
            "scrape complete"
        );
        Ok(summary)
    }

    fn write_unit(
        &self,
        resolver: &mut FilenameResolver,
        unit: &SealedUnit,
    ) -> Result<ManifestEntry, HarvestError> {
        let path = resolver.resolve(&unit.file_base());
        std::fs::write(&path, &unit.content).map_err(|source| HarvestError::WriteUnit {
            path: path.clone(),
            source,
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        info!(file = %filename, sources = unit.sources.len(), "sealed output unit");
        Ok(ManifestEntry::from_unit(unit, filename))
    }
}

/// Parse and validate raw seed strings
fn parse_seeds(raw: &[String]) -> Result<Vec<Url>, HarvestError> {
    raw.iter()
        .map(|seed| {
            if !seed.starts_with("http://") && !seed.starts_with("https://") {
                return Err(HarvestError::InvalidSeedScheme(seed.clone()));
            }
            Url::parse(seed).map_err(|source| HarvestError::InvalidSeed {
                url: seed.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batcher::UnitKind;

    #[test]
    fn test_parse_seeds_valid() {
        let seeds = parse_seeds(&["https://example.org/docs".to_string()]).unwrap();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].host_str(), Some("example.org"));
    }

    #[test]
    fn test_parse_seeds_rejects_bad_scheme() {
        let err = parse_seeds(&["ftp://example.org".to_string()]).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidSeedScheme(_)));
    }

    #[test]
    fn test_parse_seeds_rejects_malformed() {
        let err = parse_seeds(&["https://".to_string()]).unwrap_err();
        assert!(matches!(err, HarvestError::InvalidSeed { .. }));
    }

    #[test]
    fn test_write_unit_records_filename() {
        let dir = tempfile::tempdir().unwrap();
        let scraper = Scraper::new(ScrapeOptions::new(dir.path()));
        let mut resolver = FilenameResolver::new(dir.path());

        let unit = SealedUnit {
            kind: UnitKind::Batch { index: 1 },
            content: "batch body".to_string(),
            sources: vec![Url::parse("https://e.org/a").unwrap()],
        };

        let entry = scraper.write_unit(&mut resolver, &unit).unwrap();
        assert_eq!(entry.filename, "batch_01.md");
        let body = std::fs::read_to_string(dir.path().join("batch_01.md")).unwrap();
        assert_eq!(body, "batch body");
    }

    #[test]
    fn test_summary_accessors() {
        let summary = ScrapeSummary {
            processed: 0,
            failed: 3,
            batches: 0,
            standalones: 0,
            output_dir: PathBuf::from("out"),
            manifest: None,
        };
        assert!(summary.nothing_extracted());
        assert_eq!(summary.units(), 0);
    }
}
