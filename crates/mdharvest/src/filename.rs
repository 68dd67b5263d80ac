//! Filename resolution
//!
//! Derives stable, filesystem-safe names from URLs and guarantees that
//! no file produced in a run collides with another run-produced file or
//! with anything already on disk. Re-running against the same output
//! directory grows numeric suffixes instead of overwriting.

use std::collections::HashMap;
use std::path::PathBuf;
use url::Url;

/// Extensions stripped from the last path segment when naming
const PAGE_EXTENSIONS: &[&str] = &[".html", ".htm", ".php", ".asp", ".jsp"];

/// Derive a filesystem-safe base name (no extension) from a URL
///
/// Prefers the URL path with separators folded to underscores; falls
/// back to the host for root URLs. `https://docs.example.org/guide/intro.html`
/// becomes `guide_intro`.
pub fn slug(url: &Url) -> String {
    let path = url.path().trim_matches('/');
    if !path.is_empty() {
        let name = path.replace('/', "_");
        let name: String = strip_page_extension(&name)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if !name.is_empty() {
            return name;
        }
    }

    url.host_str().unwrap_or("output").replace('.', "_")
}

/// Derive a human-readable page title from a URL
///
/// Uses the last path segment with its page extension stripped and
/// separators turned into spaces, title-cased. Root URLs title as the
/// host name.
pub fn page_title(url: &Url) -> String {
    let path = url.path().trim_matches('/');
    if path.is_empty() {
        return url.host_str().unwrap_or_default().to_string();
    }

    let last = path.rsplit('/').next().unwrap_or(path);
    title_case(&strip_page_extension(last).replace(['-', '_'], " "))
}

/// Sanitized directory name for a seed's output, derived from its host
pub fn dir_name_for_seed(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    let host = host.strip_prefix("www.").unwrap_or(host);
    let name: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() {
        "output".to_string()
    } else {
        name
    }
}

fn strip_page_extension(name: &str) -> &str {
    for ext in PAGE_EXTENSIONS {
        if let Some(stripped) = name.strip_suffix(ext) {
            return stripped;
        }
    }
    name
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-run registry of reserved output names
///
/// Uniqueness comes from two checks: a name already handed out in this
/// run gets the next numeric suffix, and a name already present on disk
/// (from a prior run) is never reused.
pub struct FilenameResolver {
    dir: PathBuf,
    used: HashMap<String, u32>,
}

impl FilenameResolver {
    /// Create a resolver rooted at the output directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            used: HashMap::new(),
        }
    }

    /// Reserve a free path for `base`, appending `.md`
    ///
    /// On collision appends `_01`, `_02`, ... before the extension until
    /// a free path is found.
    pub fn resolve(&mut self, base: &str) -> PathBuf {
        if !self.used.contains_key(base) {
            let candidate = self.dir.join(format!("{base}.md"));
            if !candidate.exists() {
                self.used.insert(base.to_string(), 1);
                return candidate;
            }
        }

        let mut counter = self.used.get(base).copied().unwrap_or(1);
        loop {
            let candidate = self.dir.join(format!("{base}_{counter:02}.md"));
            counter += 1;
            if !candidate.exists() {
                self.used.insert(base.to_string(), counter);
                return candidate;
            }
        }
    }
}
