// LogPanel - core/filter.rs
//
// Line filter for log text: keep lines containing the query, case-insensitive.
// Core layer: pure logic, no I/O.

/// A prepared case-insensitive substring filter.
///
/// An empty query is the identity filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    /// Query exactly as the user typed it.
    query: String,

    /// Lowercased query used for matching.
    needle: String,
}

impl LineFilter {
    /// Prepare a filter for `query`.
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            needle: query.to_lowercase(),
        }
    }

    /// The query as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns true if this filter passes text through unchanged.
    pub fn is_identity(&self) -> bool {
        self.query.is_empty()
    }

    /// Check a single line against the query.
    pub fn matches(&self, line: &str) -> bool {
        self.is_identity() || line.to_lowercase().contains(&self.needle)
    }

    /// Keep only matching lines of `text`, in order, joined with `\n`.
    ///
    /// Non-matching lines are dropped, not blanked. A trailing `\n` yields a
    /// trailing empty line, which survives only the identity filter.
    pub fn apply(&self, text: &str) -> String {
        if self.is_identity() {
            return text.to_string();
        }
        text.split('\n')
            .filter(|line| self.matches(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Free-function form of [`LineFilter::apply`].
pub fn filter(text: &str, query: &str) -> String {
    LineFilter::new(query).apply(text)
}
