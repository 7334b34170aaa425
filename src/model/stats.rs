//! Reporting models for on-demand ticket statistics.

use std::collections::BTreeMap;

/// Read-only rollup over the full ticket collection.
///
/// Computed on demand; not part of the lifecycle state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketStats {
    /// Ticket counts keyed by lifecycle status string.
    pub by_status: BTreeMap<String, u64>,
    /// Non-deleted ticket counts keyed by priority level.
    pub by_priority: BTreeMap<String, u64>,
    /// Tickets created within the requested window.
    pub created_in_window: u64,
    /// Average seconds from creation to the first non-creator message.
    pub avg_first_response_secs: Option<f64>,
    /// Average seconds from creation to closure.
    pub avg_resolution_secs: Option<f64>,
    /// Review rating counts keyed by the stored star string.
    pub rating_counts: BTreeMap<String, u64>,
}
