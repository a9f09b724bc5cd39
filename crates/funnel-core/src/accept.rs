//! File-type filtering for file pickers and drop targets.
//!
//! Parses the same syntax as the HTML `accept` attribute: a
//! comma-separated list of `.ext` suffixes, `type/*` wildcards, and
//! exact `type/subtype` MIME types. A file is accepted when any entry
//! matches. An empty filter accepts everything.

/// One entry of an accept list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// `.json`, stored lowercase with the leading dot.
    Extension(String),
    /// `image/*`, stored as the lowercase top-level type.
    Wildcard(String),
    /// `application/json`, stored lowercase.
    Exact(String),
}

/// A parsed `accept` filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptFilter {
    patterns: Vec<Pattern>,
}

impl AcceptFilter {
    /// Parse an `accept` string. Blank entries are ignored.
    #[must_use]
    pub fn parse(accept: &str) -> Self {
        let patterns = accept
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let entry = entry.to_ascii_lowercase();
                if entry.starts_with('.') {
                    Pattern::Extension(entry)
                } else if let Some(top) = entry.strip_suffix("/*") {
                    Pattern::Wildcard(top.to_owned())
                } else {
                    Pattern::Exact(entry)
                }
            })
            .collect();
        Self { patterns }
    }

    /// Filter that accepts every file.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Returns `true` if the filter has no entries and accepts everything.
    #[must_use]
    pub const fn accepts_all(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check a file by its name and MIME type (empty when unknown).
    #[must_use]
    pub fn accepts(&self, name: &str, mime_type: &str) -> bool {
        if self.accepts_all() {
            return true;
        }
        let name = name.to_ascii_lowercase();
        let mime_type = mime_type.to_ascii_lowercase();
        let top_level = mime_type.split_once('/').map(|(top, _)| top);

        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Extension(ext) => name.ends_with(ext.as_str()),
            Pattern::Wildcard(top) => top_level == Some(top.as_str()),
            Pattern::Exact(exact) => !mime_type.is_empty() && mime_type == *exact,
        })
    }

    /// Keep only the accepted items, preserving order.
    ///
    /// `describe` yields the `(name, mime_type)` of an item. Rejected
    /// items are dropped without being reported.
    pub fn retain_accepted<T, F>(&self, items: Vec<T>, describe: F) -> Vec<T>
    where
        F: Fn(&T) -> (String, String),
    {
        if self.accepts_all() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| {
                let (name, mime_type) = describe(item);
                self.accepts(&name, &mime_type)
            })
            .collect()
    }
}

impl From<Option<&str>> for AcceptFilter {
    fn from(accept: Option<&str>) -> Self {
        accept.map_or_else(Self::any, Self::parse)
    }
}
