//! Domain models and operation-specific parameter types.
//!
//! Entity models never leave the data layer; repositories convert them into
//! these domain models at the boundary, and operations take dedicated params
//! structs instead of long argument lists.

pub mod message;
pub mod stats;
pub mod ticket;
