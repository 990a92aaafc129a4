use serde::Serialize;
use std::fmt;

/// Ordering of the catalog when no search is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Title,
    Author,
}

impl SortBy {
    /// Interprets the `sort_by` query parameter. Anything other than exactly
    /// `author` falls back to ordering by title.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("author") => SortBy::Author,
            _ => SortBy::Title,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Title => "title",
            SortBy::Author => "author",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
