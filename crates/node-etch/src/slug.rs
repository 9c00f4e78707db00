//! Slugs for file names and heading anchors

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Characters GitHub drops when deriving a heading id
    static ref ANCHOR_STRIP_REGEX: Regex = Regex::new(r"[^\p{L}\p{M}\p{N}\p{Pc} -]").unwrap();
}

/// Generate a file-name-safe slug from a string.
///
/// Lowercases the input, replaces anything that is not an ASCII letter or
/// digit with hyphens, collapses runs of hyphens and trims them from both
/// ends.
///
/// # Examples
///
/// ```
/// use node_etch::slug::slug;
///
/// assert_eq!(slug("Add Numbers"), "add-numbers");
/// assert_eq!(slug("image_blur_custom"), "image-blur-custom");
/// ```
pub fn slug(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '-',
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Generate a slug not present in `existing`, appending `-1`, `-2`...
pub fn unique_slug(base: &str, existing: &[String]) -> String {
    let base_slug = match slug(base) {
        s if s.is_empty() => "node".to_string(),
        s => s,
    };

    if !existing.contains(&base_slug) {
        return base_slug;
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", base_slug, counter);
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Heading id the way GitHub derives it: lowercase, punctuation other than
/// `-` and `_` removed, each space turned into a hyphen.
///
/// # Examples
///
/// ```
/// use node_etch::slug::anchor_slug;
///
/// assert_eq!(anchor_slug("Add Numbers"), "add-numbers");
/// assert_eq!(anchor_slug("Blur | Custom"), "blur--custom");
/// ```
pub fn anchor_slug(heading: &str) -> String {
    let lower = heading.trim().to_lowercase();
    ANCHOR_STRIP_REGEX.replace_all(&lower, "").replace(' ', "-")
}

/// Heading ids already used in one document
#[derive(Debug, Clone, Default)]
pub struct Anchors {
    used: HashSet<String>,
}

impl Anchors {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding the ids of fixed headings
    pub fn with_headings(headings: &[&str]) -> Self {
        let mut anchors = Self::new();
        for heading in headings {
            anchors.anchor(heading);
        }
        anchors
    }

    /// Id for the next heading with this text; repeated headings get
    /// `-1`, `-2`... like GitHub numbers them.
    pub fn anchor(&mut self, heading: &str) -> String {
        let base = anchor_slug(heading);
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
