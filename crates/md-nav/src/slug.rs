use std::collections::{HashMap, HashSet};

/// Convert a heading title into a URL-fragment-safe slug.
///
/// Lowercases, drops everything outside `[a-z0-9\s-]`, turns whitespace runs
/// into a single `-`, collapses repeated `-` and trims `-` from both ends.
/// The result may be empty (e.g. for a title made only of punctuation).
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_dash = true;
        }
    }

    out
}

/// Hands out document-unique ids, suffixing collisions in order of first
/// occurrence: `setup`, `setup-1`, `setup-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SlugRegistry {
    next_suffix: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `base` if unused, otherwise the next free `base-<n>`.
    pub fn unique(&mut self, base: &str) -> String {
        if !self.issued.contains(base) {
            self.next_suffix.entry(base.to_string()).or_insert(1);
            self.issued.insert(base.to_string());
            return base.to_string();
        }

        let counter = self.next_suffix.entry(base.to_string()).or_insert(1);
        let mut candidate = format!("{base}-{counter}");
        *counter += 1;
        // A literal title like "Setup 1" may already own "setup-1".
        while self.issued.contains(&candidate) {
            candidate = format!("{base}-{counter}");
            *counter += 1;
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Whether an id has already been handed out.
    pub fn contains(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}

/// Build the anchor id for a section heading.
///
/// `line_index` is the 0-based index of the heading line within the text
/// being parsed; it names the fallback id when the title has no sluggable
/// characters.
pub fn section_id(
    title: &str,
    prefix: &str,
    line_index: usize,
    registry: &mut SlugRegistry,
) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        base = format!("section-{line_index}");
    }
    if !prefix.is_empty() {
        base = format!("{prefix}-{base}");
    }
    registry.unique(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What's New? (v2.0)"), "whats-new-v20");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_slugify_collapses_dashes_and_whitespace() {
        assert_eq!(slugify("  a  --  b\t\tc  "), "a-b-c");
        assert_eq!(slugify("--lead-and-trail--"), "lead-and-trail");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Résumé"), "caf-rsum");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_registry_suffixes_in_order() {
        let mut reg = SlugRegistry::new();
        assert_eq!(reg.unique("setup"), "setup");
        assert_eq!(reg.unique("setup"), "setup-1");
        assert_eq!(reg.unique("setup"), "setup-2");
        assert_eq!(reg.unique("usage"), "usage");
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn test_registry_skips_literal_collision() {
        let mut reg = SlugRegistry::new();
        assert_eq!(reg.unique("setup-1"), "setup-1");
        assert_eq!(reg.unique("setup"), "setup");
        assert_eq!(reg.unique("setup"), "setup-2");
        assert!(reg.contains("setup-2"));
    }

    #[test]
    fn test_section_id_prefix_and_fallback() {
        let mut reg = SlugRegistry::new();
        assert_eq!(section_id("Sub", "title", 4, &mut reg), "title-sub");
        assert_eq!(section_id("!!!", "", 7, &mut reg), "section-7");
        assert_eq!(section_id("???", "title", 2, &mut reg), "title-section-2");
    }
}
