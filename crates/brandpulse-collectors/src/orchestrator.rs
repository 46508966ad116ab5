//! Sequential collection across all sources for one brand.

use brandpulse_core::Source;

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::report::{CollectionSummary, SourceReport};
use crate::sources::collect_source;

/// Collects from every source for one brand, in registry order.
///
/// Sources are isolated: a failure in one is recorded in its report and the
/// run continues with the next. Rate limits are not failures; the source is
/// marked for retry and the next scheduled run covers the gap, since the
/// store-if-new path makes re-collection idempotent.
pub async fn run_all(ctx: &CollectorContext, brand: &BrandTarget) -> CollectionSummary {
    let mut summary = CollectionSummary::default();

    for source in Source::ALL {
        let report = match collect_source(ctx, brand, source).await {
            Ok(stats) => {
                tracing::info!(
                    brand = %brand.name,
                    source = %source,
                    found = stats.found,
                    new = stats.new,
                    item_errors = stats.errors.len(),
                    "source collected"
                );
                SourceReport {
                    source,
                    items_found: stats.found,
                    items_new: stats.new,
                    retry_later: false,
                    errors: stats.errors,
                }
            }
            Err(CollectorError::RateLimited) => {
                tracing::warn!(
                    brand = %brand.name,
                    source = %source,
                    "rate limited, will retry on the next run"
                );
                SourceReport {
                    source,
                    items_found: 0,
                    items_new: 0,
                    retry_later: true,
                    errors: Vec::new(),
                }
            }
            Err(e) => {
                tracing::warn!(
                    brand = %brand.name,
                    source = %source,
                    error = %e,
                    "source collection failed"
                );
                SourceReport {
                    source,
                    items_found: 0,
                    items_new: 0,
                    retry_later: false,
                    errors: vec![e.to_string()],
                }
            }
        };
        summary.reports.push(report);
    }

    summary
}
