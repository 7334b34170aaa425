//! Business logic orchestration between the command layer, repositories and
//! the Discord API.
//!
//! The lifecycle engine lives in `ticket/`; `permission` projects channel
//! overwrite sets from ticket state; `transcript` and `notify` handle the
//! post-transition side effects of closing and deleting; `stats` provides
//! read-only rollups.

pub mod notify;
pub mod permission;
pub mod stats;
pub mod ticket;
pub mod transcript;
