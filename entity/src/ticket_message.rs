use sea_orm::entity::prelude::*;

/// One recorded channel message belonging to a ticket.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ticket_message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub ticket_id: i64,
    pub author_id: String,
    pub author_name: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub sent_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::TicketId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Ticket,
    #[sea_orm(has_many = "super::ticket_attachment::Entity")]
    TicketAttachment,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::ticket_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketAttachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
