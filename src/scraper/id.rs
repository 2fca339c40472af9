//! Listing id extraction from detail-page URLs

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// A compiled id pattern whose first capture group is the listing id
pub struct IdPattern {
    pub name: &'static str,
    regex: Regex,
}

impl IdPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("id pattern is a valid regex"),
        }
    }

    /// Leftmost match's group 1, if any.
    pub fn capture(&self, url: &str) -> Option<String> {
        self.regex
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// `/itm/<optional-slug>/<digits>`. The slug is matched lazily, so the first
/// digit run following `/itm/` or `/itm/<slug>/` wins.
pub static PRIMARY_ID_PATTERN: LazyLock<IdPattern> =
    LazyLock::new(|| IdPattern::new("primary", r"/itm/(?:.*?/)?(\d+)"));

/// `itm/<digits>` anywhere in the string, leading slash not required.
pub static LOOSE_ID_PATTERN: LazyLock<IdPattern> =
    LazyLock::new(|| IdPattern::new("loose", r"itm/(\d+)"));

/// Derive a listing id from a detail URL, trying the primary pattern first.
pub fn extract_id(url: &str) -> Option<String> {
    [&*PRIMARY_ID_PATTERN, &*LOOSE_ID_PATTERN]
        .into_iter()
        .find_map(|pattern| {
            let id = pattern.capture(url)?;
            trace!("{} id pattern matched {} in {}", pattern.name, id, url);
            Some(id)
        })
}
