use sea_orm::entity::prelude::*;

/// Attachment captured from a recorded message. `data` holds the
/// gzip-compressed bytes when the attachment was small enough to store;
/// larger attachments keep only their URL.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ticket_attachment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub message_id: i32,
    pub file_name: String,
    pub url: String,
    pub content_type: Option<String>,
    pub data: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket_message::Entity",
        from = "Column::MessageId",
        to = "super::ticket_message::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    TicketMessage,
}

impl Related<super::ticket_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketMessage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
