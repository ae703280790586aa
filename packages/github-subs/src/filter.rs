//! Seen-set filtering of strings.

use dashmap::DashSet;

/// Lets only the first occurrence of each string through.
///
/// Entries are never removed. Check-and-insert is a single atomic step, so two
/// callers racing on the same string cannot both see it as new.
#[derive(Debug, Default)]
pub struct StringFilter {
    seen: DashSet<String>,
}

impl StringFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `s` was already seen; records it otherwise.
    pub fn duplicate(&self, s: &str) -> bool {
        if self.seen.contains(s) {
            return true;
        }
        !self.seen.insert(s.to_string())
    }
}
