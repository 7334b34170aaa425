use crate::data::ticket::TicketRepository;
use crate::model::ticket::{CreateTicketParams, TicketStatus};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod alerts;
mod claim;
mod close_reopen;
mod create;
mod delete;
mod find;
mod search;

/// Creation params with everything but the identities defaulted.
fn params(user_id: u64, channel_id: u64) -> CreateTicketParams {
    CreateTicketParams {
        guild_id: 900_100_200_300_400_500,
        channel_id,
        user_id,
        user_name: "tester".to_string(),
        ticket_type: "support".to_string(),
        priority: "Medium".to_string(),
        channel_topic: None,
        questions: Vec::new(),
    }
}
