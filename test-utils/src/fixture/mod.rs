//! In-memory entity fixtures with sensible default values.
//!
//! Fixtures build entity models without touching the database. Use them for
//! unit tests and for seeding factories with consistent defaults.

pub mod ticket;
