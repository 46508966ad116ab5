//! Per-source and per-run collection accounting.

use serde::Serialize;

use brandpulse_core::Source;

use crate::error::CollectorError;

/// Counts and per-item errors from one source collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Items the source surfaced, stored or not.
    pub found: usize,
    /// Items newly persisted this run.
    pub new: usize,
    /// Per-item failures; the loop continues past each one.
    pub errors: Vec<String>,
}

impl SourceStats {
    pub(crate) fn record(&mut self, inserted: bool) {
        self.found += 1;
        if inserted {
            self.new += 1;
        }
    }

    /// Counts a surfaced item whose processing failed.
    pub(crate) fn record_failure(&mut self, error: &CollectorError) {
        self.found += 1;
        self.errors.push(error.to_string());
    }
}

/// Outcome of one source within a collection run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: Source,
    pub items_found: usize,
    pub items_new: usize,
    /// Set when the source was rate limited and deferred to the next run.
    pub retry_later: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Outcome of a full collection run for one brand.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionSummary {
    pub reports: Vec<SourceReport>,
}

impl CollectionSummary {
    #[must_use]
    pub fn items_found(&self) -> usize {
        self.reports.iter().map(|r| r.items_found).sum()
    }

    #[must_use]
    pub fn items_new(&self) -> usize {
        self.reports.iter().map(|r| r.items_new).sum()
    }

    /// True when every source either succeeded or was merely deferred.
    #[must_use]
    pub fn fully_succeeded(&self) -> bool {
        self.reports.iter().all(|r| r.errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_totals_span_sources() {
        let summary = CollectionSummary {
            reports: vec![
                SourceReport {
                    source: Source::Reddit,
                    items_found: 5,
                    items_new: 2,
                    retry_later: false,
                    errors: Vec::new(),
                },
                SourceReport {
                    source: Source::NewsApi,
                    items_found: 3,
                    items_new: 3,
                    retry_later: false,
                    errors: vec!["boom".to_string()],
                },
            ],
        };
        assert_eq!(summary.items_found(), 8);
        assert_eq!(summary.items_new(), 5);
        assert!(!summary.fully_succeeded());
    }

    #[test]
    fn failed_items_count_as_found_but_not_new() {
        let mut stats = SourceStats::default();
        stats.record(true);
        stats.record(true);
        stats.record_failure(&CollectorError::Parse("bad timestamp".to_string()));
        stats.record(true);
        stats.record(true);

        assert_eq!(stats.found, 5);
        assert_eq!(stats.new, 4);
        assert_eq!(stats.errors.len(), 1);
    }
}
