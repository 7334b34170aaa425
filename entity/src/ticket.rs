use sea_orm::entity::prelude::*;

/// Support ticket record. One row per ticket, kept forever; "deletion" only
/// removes the Discord channel and flips `status` to `deleted`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    /// Monotonically allocated ticket number. Assigned by the repository,
    /// never by the database.
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_id: i64,
    pub guild_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
    pub ticket_type: String,
    pub priority: String,
    /// Lifecycle state: `open`, `closed`, `deleting`, `deleted`.
    pub status: String,
    pub claimed: bool,
    pub claimed_by: Option<String>,
    /// Mutual-exclusion flag for in-flight claim/unclaim operations.
    pub claim_guard: bool,
    pub close_reason: Option<String>,
    pub custom_close_reason: Option<String>,
    pub closed_at: Option<DateTimeUtc>,
    pub rating: Option<String>,
    pub review_feedback: Option<String>,
    pub alert_time: Option<DateTimeUtc>,
    pub alert_reason: Option<String>,
    pub alert_message_id: Option<String>,
    pub first_message_id: Option<String>,
    pub archive_message_id: Option<String>,
    pub log_message_id: Option<String>,
    pub channel_topic: Option<String>,
    pub message_count: i32,
    pub last_priority_change: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_message::Entity")]
    TicketMessage,
    #[sea_orm(has_many = "super::ticket_question::Entity")]
    TicketQuestion,
}

impl Related<super::ticket_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketMessage.def()
    }
}

impl Related<super::ticket_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketQuestion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
