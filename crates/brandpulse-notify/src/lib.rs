//! Notification routing: immediate alerts and daily digests over Slack,
//! Telegram, and email.
//!
//! Eligibility is the per-user toggle matrix crossed with configured
//! endpoints; delivery goes through one adapter per channel; every attempt
//! lands in the alert audit table.

mod channels;
pub mod eligibility;
pub mod error;
pub mod message;
pub mod router;

pub use eligibility::{alert_channels, digest_channels};
pub use error::NotifyError;
pub use message::{AlertMessage, DigestMessage};
pub use router::{AlertStats, ChannelConfig, Notifier};
