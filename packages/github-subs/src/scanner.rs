//! Subdomain extraction from fetched page text.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::mpsc;
use tracing::trace;

use crate::domains::DomainPattern;
use crate::filter::StringFilter;

/// Encoding leftovers that stick to the front of scraped names: `\uXXXX`
/// escapes and percent-encoded space, quote, percent, plus, slash, equals,
/// colon and at-sign.
static NAME_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:u[0-9a-f]{4}|20|22|25|2b|2f|3d|3a|40)").unwrap()
});

/// Clean up a name scraped from page text.
///
/// Lowercases and trims, then repeatedly strips boundary hyphens and a
/// leading encoding artifact, and finally drops a single leading dot. The
/// result may be empty.
pub fn clean_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut name = lowered.as_str();

    loop {
        name = name.trim_matches('-');
        match NAME_STRIP.find(name) {
            Some(m) => name = &name[m.end()..],
            None => break,
        }
    }

    if name.len() > 1 && name.starts_with('.') {
        name = &name[1..];
    }
    name.to_string()
}

/// Extracts names matching a domain pattern and emits each one once.
pub struct ContentScanner {
    pattern: DomainPattern,
    seen_names: Arc<StringFilter>,
    names: mpsc::UnboundedSender<String>,
}

impl ContentScanner {
    /// Create a scanner emitting into `names`.
    pub fn new(
        pattern: DomainPattern,
        seen_names: Arc<StringFilter>,
        names: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            pattern,
            seen_names,
            names,
        }
    }

    /// Scan `text` and emit every first-seen cleaned name.
    ///
    /// Returns the number of names emitted.
    pub fn scan(&self, text: &str) -> usize {
        let mut emitted = 0;

        for found in self.pattern.find_iter(text) {
            let name = clean_name(found);
            if name.is_empty() || self.seen_names.duplicate(&name) {
                continue;
            }
            trace!(name = %name, "Discovered name");
            if self.names.send(name).is_ok() {
                emitted += 1;
            }
        }

        emitted
    }
}
