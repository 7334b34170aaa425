//! Timer-driven background tasks.
//!
//! Two independent loops run alongside command handling: the alert poll
//! (`alerts`) and the rename throttler drain tick (`rename`). Both are safe
//! to interleave with user-triggered operations on the same ticket; the
//! lifecycle transitions they share are guarded by conditional updates.

pub mod alerts;
pub mod rename;
