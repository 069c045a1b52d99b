//! Scan results and namespace filtering for bulk reads.

use std::path::PathBuf;

use httptap_models::ExchangeRecord;

/// Filter value meaning "every namespace".
pub const ALL_NAMESPACES: &str = "all";

/// Which namespaces a bulk read should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceFilter {
    All,
    Only(String),
}

impl NamespaceFilter {
    /// Viewer-style parsing: `"all"` and the empty string mean no filter.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | ALL_NAMESPACES => Self::All,
            namespace => Self::Only(namespace.to_string()),
        }
    }

    pub fn matches(&self, record: &ExchangeRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(namespace) => record.namespace == *namespace,
        }
    }
}

impl From<&str> for NamespaceFilter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Why a file was left out of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable(String),
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of a bulk read: valid records, newest first, plus every file that
/// had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub records: Vec<ExchangeRecord>,
    pub skipped: Vec<SkippedEntry>,
}

impl ScanReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_synonyms() {
        assert_eq!(NamespaceFilter::parse(""), NamespaceFilter::All);
        assert_eq!(NamespaceFilter::parse("all"), NamespaceFilter::All);
        assert_eq!(NamespaceFilter::parse(" all "), NamespaceFilter::All);
        assert_eq!(
            NamespaceFilter::parse("user-service"),
            NamespaceFilter::Only("user-service".to_string())
        );
    }
}
