//! Entity factories for inserting test data.
//!
//! Factories insert entities with sensible defaults and unique identifiers,
//! reducing boilerplate in repository and service tests.

pub mod helpers;
pub mod ticket;
pub mod ticket_message;
pub mod ticket_question;
