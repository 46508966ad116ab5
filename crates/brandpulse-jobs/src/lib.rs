//! Batch jobs: the scheduled refresh sweep and the daily digest.
//!
//! Both jobs book-end themselves in the `job_runs` table: created in
//! `running`, transitioned to `completed` with summary metadata or `failed`
//! with the captured error.

pub mod digest;
pub mod error;
pub mod refresh;

pub use digest::{run_digest, DigestOutcome};
pub use error::JobError;
pub use refresh::{run_refresh, RefreshOutcome};
