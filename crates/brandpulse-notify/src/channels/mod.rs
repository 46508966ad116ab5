//! Channel adapters. Each module renders and delivers for one channel.

pub(crate) mod email;
pub(crate) mod slack;
pub(crate) mod telegram;
