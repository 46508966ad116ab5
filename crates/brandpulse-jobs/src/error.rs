use thiserror::Error;

/// Errors that abort a whole batch job (as opposed to per-brand failures,
/// which are isolated and recorded in the run metadata).
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Db(#[from] brandpulse_db::DbError),

    #[error(transparent)]
    Notify(#[from] brandpulse_notify::NotifyError),

    #[error(transparent)]
    Collector(#[from] brandpulse_collectors::CollectorError),
}
