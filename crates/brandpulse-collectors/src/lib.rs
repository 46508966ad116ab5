//! Source collectors: pull brand mentions and reviews from external
//! platforms, classify them, and persist anything new.
//!
//! Each source lives in its own module under [`sources`] and shares one
//! ingest path: check existence, sanitize, classify, walk the priority
//! ladder, store-if-new. The orchestrator runs sources sequentially and
//! isolates their failures.

pub mod context;
pub mod error;
mod ingest;
mod jsonld;
pub mod orchestrator;
pub mod report;
mod sources;
mod util;

pub use context::{BrandTarget, CollectorConfig, CollectorContext};
pub use error::CollectorError;
pub use orchestrator::run_all;
pub use report::{CollectionSummary, SourceReport, SourceStats};
