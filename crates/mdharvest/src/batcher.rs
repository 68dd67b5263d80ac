//! Output batching policy
//!
//! The batcher is a sequential state machine: documents arrive one at a
//! time and each is either merged into the running batch, made to flush
//! the running batch first, or sealed alone as a standalone unit. The
//! decision depends on running totals, so the batcher must be driven
//! from a single consumer; fetch/convert concurrency happens upstream.

use crate::filename::{page_title, slug};
use chrono::Local;
use url::Url;

/// Hard ceiling on a sealed batch's character length
pub const DEFAULT_MAX_CHARS: usize = 100_000;
/// Hard ceiling on a sealed batch's UTF-8 byte size
pub const DEFAULT_MAX_BYTES: usize = 300_000;
/// Content below this is too small to stand alone and is always merged
pub const DEFAULT_MIN_CHARS: usize = 5_000;

/// Size thresholds governing batch sealing
#[derive(Debug, Clone, Copy)]
pub struct BatchPolicy {
    /// Maximum characters in a sealed batch
    pub max_chars: usize,
    /// Maximum UTF-8 bytes in a sealed batch
    ///
    /// Checked independently of `max_chars`: multi-byte-heavy content
    /// can cross the byte ceiling while well under the character count.
    pub max_bytes: usize,
    /// A batch under this many characters always absorbs the next document
    pub min_chars: usize,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_bytes: DEFAULT_MAX_BYTES,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

impl BatchPolicy {
    /// Set the character ceiling
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Set the byte ceiling
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Set the stand-alone minimum
    pub fn min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

/// A successfully converted page, en route to an output unit
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// Source URL the content came from
    pub url: Url,
    /// Normalized Markdown text
    pub markdown: String,
}

impl ConvertedDocument {
    /// Create a converted document
    pub fn new(url: Url, markdown: impl Into<String>) -> Self {
        Self {
            url,
            markdown: markdown.into(),
        }
    }

    /// Character count of the Markdown text
    pub fn char_count(&self) -> usize {
        self.markdown.chars().count()
    }

    /// UTF-8 byte size of the Markdown text
    pub fn byte_size(&self) -> usize {
        self.markdown.len()
    }
}

/// What kind of output unit a sealed unit is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Aggregated batch file, 1-based run-local index
    Batch {
        /// Position in seal order among batches
        index: u32,
    },
    /// Single oversized document written alone
    Standalone,
}

/// A finished output unit, ready to be written to disk
///
/// Sealed units are never mutated again; the orchestrator writes them
/// out in the order the batcher produces them.
#[derive(Debug, Clone)]
pub struct SealedUnit {
    /// Batch or standalone
    pub kind: UnitKind,
    /// Rendered file content including per-document banners
    pub content: String,
    /// Contributing source URLs, in merge order
    pub sources: Vec<Url>,
}

impl SealedUnit {
    /// Base filename (no extension) for this unit
    pub fn file_base(&self) -> String {
        match self.kind {
            UnitKind::Batch { index } => format!("batch_{index:02}"),
            UnitKind::Standalone => {
                let page = self
                    .sources
                    .first()
                    .map(slug)
                    .unwrap_or_else(|| "page".to_string());
                format!("INDIVIDUAL_{page}")
            }
        }
    }

    /// Human label used in the manifest
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            UnitKind::Batch { .. } => "batch",
            UnitKind::Standalone => "individual",
        }
    }
}

/// Size-bounded batch accumulator
pub struct Batcher {
    policy: BatchPolicy,
    content: String,
    content_chars: usize,
    sources: Vec<Url>,
    next_index: u32,
}

impl Batcher {
    /// Create an empty batcher
    pub fn new(policy: BatchPolicy) -> Self {
        Self {
            policy,
            content: String::new(),
            content_chars: 0,
            sources: Vec::new(),
            next_index: 1,
        }
    }

    /// Route one converted document
    ///
    /// Returns at most one sealed unit: either the document itself as a
    /// standalone (when it alone exceeds the ceilings), or the running
    /// batch flushed to make room. An oversized document never touches
    /// the running batch. A batch still under `min_chars` (including the
    /// empty batch at run startup) always absorbs the document, whatever
    /// the combined size.
    pub fn push(&mut self, doc: ConvertedDocument) -> Option<SealedUnit> {
        if doc.char_count() > self.policy.max_chars || doc.byte_size() > self.policy.max_bytes {
            return Some(SealedUnit {
                kind: UnitKind::Standalone,
                content: render_section(&doc),
                sources: vec![doc.url],
            });
        }

        let section = render_section(&doc);
        let section_chars = section.chars().count();

        let mut flushed = None;
        if self.content_chars >= self.policy.min_chars {
            let combined_chars = self.content_chars + section_chars;
            let combined_bytes = self.content.len() + section.len();
            if combined_chars > self.policy.max_chars || combined_bytes > self.policy.max_bytes {
                flushed = Some(self.seal_batch());
            }
        }

        self.content.push_str(&section);
        self.content_chars += section_chars;
        self.sources.push(doc.url);

        flushed
    }

    /// Seal the trailing batch at end-of-run
    ///
    /// A partially filled batch is always flushed, never dropped; a run
    /// whose whole output stays under `min_chars` still yields exactly
    /// one batch.
    pub fn finish(&mut self) -> Option<SealedUnit> {
        if self.content.is_empty() {
            None
        } else {
            Some(self.seal_batch())
        }
    }

    /// Source URLs merged into the running batch so far
    pub fn pending_sources(&self) -> &[Url] {
        &self.sources
    }

    fn seal_batch(&mut self) -> SealedUnit {
        let kind = UnitKind::Batch {
            index: self.next_index,
        };
        self.next_index += 1;
        self.content_chars = 0;
        SealedUnit {
            kind,
            content: std::mem::take(&mut self.content),
            sources: std::mem::take(&mut self.sources),
        }
    }
}

/// Render one document with its separator banner
fn render_section(doc: &ConvertedDocument) -> String {
    format!(
        "# {title}\n\n**Source:** {url}\n**Fetched:** {stamp}\n\n{rule}\n\n{body}\n\n",
        title = page_title(&doc.url),
        url = doc.url,
        stamp = Local::now().format("%Y-%m-%d %H:%M:%S"),
        rule = "=".repeat(80),
        body = doc.markdown,
    )
}
