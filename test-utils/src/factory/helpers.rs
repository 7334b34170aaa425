//! Shared helper utilities for factory methods.
//!
//! This module provides common utilities used across all factory modules,
//! including ID generation and convenience methods for creating entities
//! with their dependencies.

use sea_orm::{DatabaseConnection, DbErr};

/// Counter for generating unique IDs in tests.
///
/// This atomic counter ensures each factory-created entity gets a unique
/// identifier to prevent collisions in tests.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
///
/// This function provides monotonically increasing values for use in
/// generating unique test identifiers across all factories.
///
/// # Returns
/// - `u64` - Next unique counter value
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates an open ticket with a run of recorded messages.
///
/// Convenience method for transcript and statistics tests that need a ticket
/// with message history. Messages alternate between the ticket creator and a
/// fixed support user id (`"support-1"`).
///
/// # Arguments
/// - `db` - Database connection
/// - `message_count` - Number of messages to record
///
/// # Returns
/// - `Ok((ticket, messages))` - Created ticket and its messages in order
/// - `Err(DbErr)` - Database error during creation
pub async fn create_ticket_with_messages(
    db: &DatabaseConnection,
    message_count: usize,
) -> Result<
    (
        entity::ticket::Model,
        Vec<entity::ticket_message::Model>,
    ),
    DbErr,
> {
    let ticket = crate::factory::ticket::create_ticket(db).await?;

    let mut messages = Vec::with_capacity(message_count);
    for i in 0..message_count {
        let (author_id, author_name) = if i % 2 == 0 {
            (ticket.user_id.as_str(), ticket.user_name.as_str())
        } else {
            ("support-1", "Support")
        };

        let message = crate::factory::ticket_message::create_message(
            db,
            ticket.ticket_id,
            author_id,
            author_name,
            &format!("message {}", i),
        )
        .await?;
        messages.push(message);
    }

    Ok((ticket, messages))
}
