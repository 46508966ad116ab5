//! Per-source collectors.

mod g2;
mod newsapi;
mod reddit;
mod trustpilot;
mod twitter;
mod youtube;

use brandpulse_core::Source;

use crate::context::{BrandTarget, CollectorContext};
use crate::error::CollectorError;
use crate::report::SourceStats;

/// Runs the collector for one source.
pub(crate) async fn collect_source(
    ctx: &CollectorContext,
    brand: &BrandTarget,
    source: Source,
) -> Result<SourceStats, CollectorError> {
    match source {
        Source::Trustpilot => trustpilot::collect(ctx, brand).await,
        Source::G2 => g2::collect(ctx, brand).await,
        Source::NewsApi => newsapi::collect(ctx, brand).await,
        Source::Reddit => reddit::collect(ctx, brand).await,
        Source::Youtube => youtube::collect(ctx, brand).await,
        Source::Twitter => twitter::collect(ctx, brand).await,
    }
}
