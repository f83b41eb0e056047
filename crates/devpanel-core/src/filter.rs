use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use devpanel_types::{LogEntry, LogKind, MinLevel};

/// Filter state for the panel's log view
///
/// All categories are intersective: an entry must pass the kind filter, the
/// tag filter, and the search query to be shown. Matching never mutates the
/// buffer and never re-sorts.
#[derive(Clone, Default)]
pub struct FilterState {
    /// Kinds to include (empty = all)
    kinds: HashSet<LogKind>,

    /// Tags the entry must all carry (empty = no tag restriction)
    tags: BTreeSet<String>,

    /// Free-text query; empty matches everything
    query: String,

    /// Compiled case-insensitive substring matcher for the query
    regex: Option<Regex>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the kind set from a configured minimum severity
    pub fn from_min_level(min: MinLevel) -> Self {
        let floor = min.floor();
        let kinds = LogKind::ALL.into_iter().filter(|k| *k >= floor).collect();
        Self {
            kinds,
            ..Self::default()
        }
    }

    /// Replace the kind set
    pub fn with_kinds<I: IntoIterator<Item = LogKind>>(mut self, kinds: I) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Replace the required tag set
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the search query
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.set_query(query.into());
        self
    }

    /// Set the search query, recompiling the matcher
    pub fn set_query(&mut self, query: String) {
        self.regex = if query.is_empty() {
            None
        } else {
            // Escaped pattern, so this is substring matching and cannot fail
            Regex::new(&format!("(?i){}", regex::escape(&query))).ok()
        };
        self.query = query;
    }

    /// Toggle one kind in or out of the kind set
    pub fn toggle_kind(&mut self, kind: LogKind) {
        if !self.kinds.remove(&kind) {
            self.kinds.insert(kind);
        }
    }

    /// Toggle one required tag
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn kinds(&self) -> &HashSet<LogKind> {
        &self.kinds
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Check if the filter matches everything
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.tags.is_empty() && self.query.is_empty()
    }

    /// Check if a log entry passes this filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        // Kind membership
        if !self.kinds.is_empty() && !self.kinds.contains(&entry.kind) {
            return false;
        }

        // Tag containment: entry tags must be a superset of the selected tags
        if !entry.has_all_tags(self.tags.iter().map(String::as_str)) {
            return false;
        }

        // Substring search over the stringified content
        match &self.regex {
            Some(re) => re.is_match(&entry.message()),
            None => true,
        }
    }

    /// Find all query hit positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for FilterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterState")
            .field("kinds", &self.kinds)
            .field("tags", &self.tags)
            .field("query", &self.query)
            .finish()
    }
}
