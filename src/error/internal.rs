use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse id from String
    ///
    /// Stored Discord snowflakes are strings; a value that does not parse back
    /// into a u64 means the record was corrupted at write time.
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// Ticket id allocation kept colliding with concurrent creations.
    ///
    /// Ids are allocated optimistically and retried forward; running out of
    /// attempts means pathological contention or a store inconsistency.
    #[error("Failed to allocate a unique ticket id after {attempts} attempts")]
    TicketIdAllocation {
        /// Number of attempts made before giving up
        attempts: usize,
    },
}
