//! Target domain registry and subdomain pattern compilation.
//!
//! A [`DomainParser`] owns the set of target domains for a run and one
//! compiled [`DomainPattern`] per domain. Malformed domains are silently
//! ignored; callers observe them only by their absence from
//! [`DomainParser::domains`].

use indexmap::IndexSet;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Zero or more DNS labels (letters, digits, hyphen), each followed by a dot.
const SUBDOMAIN_LABELS: &str = r"(?:[A-Za-z0-9-]+\.)*";

/// A compiled matcher for a domain and all of its subdomains.
///
/// Matches are greedy, so `a.b.example.com` is reported whole, and they are
/// checked against label boundaries: `notexample.com` and
/// `example.community` never match `example.com`.
#[derive(Debug, Clone)]
pub struct DomainPattern {
    regex: Regex,
}

impl DomainPattern {
    /// Compile the pattern for `domain`.
    pub fn new(domain: &str) -> Result<Self, regex::Error> {
        let pattern = format!("{}(?i:{})", SUBDOMAIN_LABELS, regex::escape(domain));
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// All non-overlapping matches in `text`, in order of appearance.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex
            .find_iter(text)
            .filter(move |m| on_label_boundary(text, m.start(), m.end()))
            .map(|m| m.as_str())
    }

    /// True if `text` contains at least one match.
    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }
}

fn is_label_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// A match must not start inside a label, and must not run on into another
/// label (`example.com.evil.org`).
fn on_label_boundary(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    if start > 0 && is_label_byte(bytes[start - 1]) {
        return false;
    }
    match bytes.get(end) {
        Some(b) if b.is_ascii_alphanumeric() => false,
        Some(b'.') => !bytes
            .get(end + 1)
            .is_some_and(|b| b.is_ascii_alphanumeric()),
        _ => true,
    }
}

#[derive(Default)]
struct ParserState {
    patterns: HashMap<String, DomainPattern>,
    domains: IndexSet<String>,
}

/// Thread-safe registry of target domains and their patterns.
///
/// Every operation is a single critical section under one mutex.
#[derive(Default)]
pub struct DomainParser {
    state: Mutex<ParserState>,
}

impl DomainParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ParserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a domain and compile its pattern.
    ///
    /// Blank input, fewer than two labels, or an empty label are ignored.
    pub fn add_domain(&self, domain: &str) {
        let d = domain.trim();
        if d.is_empty() {
            return;
        }

        let labels: Vec<&str> = d.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            debug!(domain = %d, "Ignoring malformed domain");
            return;
        }

        let mut state = self.lock();
        if state.patterns.contains_key(d) {
            return;
        }

        match DomainPattern::new(d) {
            Ok(pattern) => {
                state.patterns.insert(d.to_string(), pattern);
                state.domains.insert(d.to_string());
            }
            Err(e) => {
                warn!(domain = %d, error = %e, "Failed to compile domain pattern");
            }
        }
    }

    /// Register each domain in order. Not atomic as a whole.
    pub fn add_domains<I, S>(&self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for d in domains {
            self.add_domain(d.as_ref());
        }
    }

    /// Look up the pattern for a previously registered domain.
    pub fn domain_regex(&self, domain: &str) -> Option<DomainPattern> {
        self.lock().patterns.get(domain).cloned()
    }

    /// Snapshot of the registered domains.
    pub fn domains(&self) -> Vec<String> {
        self.lock().domains.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matches<'a>(pattern: &'a DomainPattern, text: &'a str) -> Vec<&'a str> {
        pattern.find_iter(text).collect()
    }

    #[test]
    fn test_add_domain_registers_pattern() {
        let parser = DomainParser::new();
        parser.add_domain("  example.com ");

        assert!(parser.domain_regex("example.com").is_some());
        assert_eq!(parser.domains(), vec!["example.com".to_string()]);
    }

    #[test]
    fn test_malformed_domains_ignored() {
        let parser = DomainParser::new();
        parser.add_domains(["", "   ", "localhost", "example..com", ".example.com", "example.com."]);

        assert!(parser.domains().is_empty());
        assert!(parser.domain_regex("localhost").is_none());
        assert!(parser.domain_regex("example..com").is_none());
    }

    #[test]
    fn test_add_domain_deduplicates() {
        let parser = DomainParser::new();
        parser.add_domains(["example.com", "example.org", "example.com"]);

        let mut domains = parser.domains();
        domains.sort();
        assert_eq!(domains, vec!["example.com", "example.org"]);
    }

    #[test]
    fn test_unknown_domain_lookup() {
        let parser = DomainParser::new();
        parser.add_domain("example.com");

        assert!(parser.domain_regex("example.org").is_none());
        assert!(parser.domain_regex(" example.com").is_none());
    }

    #[test]
    fn test_pattern_matches_domain_and_subdomains() {
        let pattern = DomainPattern::new("example.com").unwrap();

        assert_eq!(matches(&pattern, "example.com"), vec!["example.com"]);
        assert_eq!(matches(&pattern, "www.example.com"), vec!["www.example.com"]);
        assert_eq!(matches(&pattern, "a.b.example.com"), vec!["a.b.example.com"]);
        assert_eq!(
            matches(&pattern, "Server: api.sub.example.com\nHost: mail.example.com"),
            vec!["api.sub.example.com", "mail.example.com"]
        );
    }

    #[test]
    fn test_pattern_respects_label_boundaries() {
        let pattern = DomainPattern::new("example.com").unwrap();

        assert!(matches(&pattern, "notexample.com").is_empty());
        assert!(matches(&pattern, "example.community").is_empty());
        assert!(matches(&pattern, "sub.example.com.evil.org").is_empty());
        assert_eq!(matches(&pattern, "see sub.example.com."), vec!["sub.example.com"]);
        assert_eq!(
            matches(&pattern, "https://cdn.example.com/assets"),
            vec!["cdn.example.com"]
        );
    }

    #[test]
    fn test_pattern_dot_is_literal() {
        let pattern = DomainPattern::new("example.com").unwrap();

        assert!(!pattern.is_match("examplexcom"));
        assert!(!pattern.is_match("www.examplexcom"));
    }

    #[test]
    fn test_pattern_keeps_hyphen_noise() {
        let pattern = DomainPattern::new("example.com").unwrap();

        assert_eq!(matches(&pattern, "--sub.example.com--"), vec!["--sub.example.com"]);
    }

    proptest! {
        #[test]
        fn prop_subdomains_matched_whole(
            labels in proptest::collection::vec("[a-z0-9][a-z0-9-]{0,10}", 1..5)
        ) {
            let pattern = DomainPattern::new("example.com").unwrap();
            let name = format!("{}.example.com", labels.join("."));
            let text = format!("url = \"https://{}/path\"", name);

            prop_assert_eq!(matches(&pattern, &text), vec![name.as_str()]);
        }
    }
}
