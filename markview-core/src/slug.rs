//! Heading anchor slugs
//!
//! GitHub-compatible slugging: lowercase, drop everything that is not an ASCII word character,
//! hyphen or whitespace, and turn each whitespace character into a hyphen. A [`Slugger`] lives
//! for exactly one render and disambiguates repeats with `-1`, `-2`, ... suffixes.

use std::collections::HashMap;

/// Stateless slug of `text`. Runs of whitespace are not collapsed.
///
/// ```ignore
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("a  b"), "a--b");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

/// Per-render slug state
#[derive(Debug, Clone, Default)]
pub struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for `text`, unique among every slug this instance has returned.
    pub fn slug(&mut self, text: &str) -> String {
        let original = slugify(text);
        let mut candidate = original.clone();
        while self.occurrences.contains_key(&candidate) {
            let count = self.occurrences.entry(original.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{original}-{count}");
        }
        self.occurrences.insert(candidate.clone(), 0);
        candidate
    }

    /// Forget every slug handed out so far
    pub fn reset(&mut self) {
        self.occurrences.clear();
    }
}
