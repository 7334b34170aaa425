//! Database repository layer for the ticket store.
//!
//! This module contains repository structs that handle database operations for
//! the ticket domain. Repositories use SeaORM entity models internally and
//! return domain models to maintain separation between the data layer and the
//! business logic layer. Lifecycle transitions on status/claim/guard fields
//! are conditional updates checked via `rows_affected` so concurrent triggers
//! cannot both advance the same transition.

pub mod stats;
pub mod ticket;
pub mod ticket_message;

#[cfg(test)]
mod test;
