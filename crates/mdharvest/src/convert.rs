//! HTML to Markdown normalization
//!
//! A small single-pass converter: scan the document character by
//! character, react to a fixed set of tags, decode entities, and tidy
//! whitespace at the end. This covers documentation pages well enough to
//! build a retrieval corpus; it is not a general-purpose HTML renderer.

/// Elements whose text content is never emitted
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "template"];

/// Check if content is HTML based on content type and body
pub fn is_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct = ct.to_lowercase();
        if ct.contains("text/html") || ct.contains("application/xhtml") {
            return true;
        }
    }

    let trimmed = body.trim_start();
    trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html")
}

/// Convert an HTML document to Markdown text
pub fn html_to_markdown(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 2);
    let mut skip_depth = 0usize;
    let mut list_depth = 0usize;
    let mut in_pre = false;
    let mut link_targets: Vec<String> = Vec::new();

    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '<' {
            if skip_depth == 0 {
                out.push(decode_entity(c, &mut chars));
            }
            continue;
        }

        // Collect the raw tag up to '>'
        let mut tag = String::new();
        for next in chars.by_ref() {
            if next == '>' {
                break;
            }
            tag.push(next);
        }

        // Comments carry no content
        if tag.starts_with("!--") {
            continue;
        }

        let lower = tag.to_lowercase();
        let closing = lower.starts_with('/');
        let name = lower
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("");
        let self_closing = tag.ends_with('/');

        if SKIP_TAGS.contains(&name) {
            if closing {
                skip_depth = skip_depth.saturating_sub(1);
            } else if !self_closing {
                skip_depth += 1;
            }
            continue;
        }
        if skip_depth > 0 {
            continue;
        }

        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if closing {
                    out.push_str("\n\n");
                } else {
                    let level = name[1..].parse::<usize>().unwrap_or(1);
                    out.push('\n');
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                }
            }
            "p" | "div" | "section" | "article" | "main" | "tr" | "table" => {
                if closing {
                    out.push_str("\n\n");
                }
            }
            "br" => out.push('\n'),
            "hr" => out.push_str("\n---\n"),
            "ul" | "ol" => {
                if closing {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        out.push('\n');
                    }
                } else {
                    list_depth += 1;
                }
            }
            "li" => {
                if !closing {
                    out.push_str("\n- ");
                }
            }
            "strong" | "b" => out.push_str("**"),
            "em" | "i" => out.push('*'),
            "pre" => {
                out.push_str("\n```\n");
                in_pre = !closing && !self_closing;
            }
            "code" => {
                if !in_pre {
                    out.push('`');
                }
            }
            "blockquote" => {
                if closing {
                    out.push('\n');
                } else {
                    out.push_str("\n> ");
                }
            }
            "a" => {
                if closing {
                    if let Some(href) = link_targets.pop() {
                        out.push_str("](");
                        out.push_str(&href);
                        out.push(')');
                    }
                } else if let Some(href) = extract_attribute(&tag, "href") {
                    out.push('[');
                    link_targets.push(href);
                }
            }
            _ => {}
        }
    }

    tidy_whitespace(&out)
}

/// Extract an attribute value from a raw tag body
fn extract_attribute(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{attr}=");
    let start = tag.to_lowercase().find(&pattern)?;
    let rest = tag[start + pattern.len()..].trim_start();

    if let Some(quoted) = rest.strip_prefix('"') {
        quoted.find('"').map(|end| quoted[..end].to_string())
    } else if let Some(quoted) = rest.strip_prefix('\'') {
        quoted.find('\'').map(|end| quoted[..end].to_string())
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

/// Decode an HTML entity starting at an ampersand
fn decode_entity(c: char, chars: &mut std::iter::Peekable<std::str::Chars>) -> char {
    if c != '&' {
        return c;
    }

    let mut entity = String::new();
    while let Some(&next) = chars.peek() {
        if next == ';' {
            chars.next();
            break;
        }
        if next.is_whitespace() || entity.len() > 10 {
            return '&';
        }
        entity.push(next);
        chars.next();
    }

    match entity.as_str() {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" | "#39" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "copy" => '\u{a9}',
        _ => entity
            .strip_prefix('#')
            .and_then(|num| {
                if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                    u32::from_str_radix(hex, 16).ok()
                } else {
                    num.parse().ok()
                }
            })
            .and_then(char::from_u32)
            .unwrap_or('&'),
    }
}

/// Collapse space runs, drop trailing spaces, keep at most one blank line
fn tidy_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    let mut newlines = 0usize;

    for c in s.chars() {
        if c == '\n' {
            pending_space = false;
            newlines += 1;
            if newlines <= 2 {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('\n');
            }
        } else if c.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() && !out.ends_with('\n') {
                out.push(' ');
            }
            pending_space = false;
            newlines = 0;
            out.push(c);
        }
    }

    out.trim().to_string()
}
