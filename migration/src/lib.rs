pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_ticket_table;
mod m20260801_000002_create_ticket_message_table;
mod m20260801_000003_create_ticket_attachment_table;
mod m20260801_000004_create_ticket_question_table;
mod m20260802_000005_create_ticket_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_ticket_table::Migration),
            Box::new(m20260801_000002_create_ticket_message_table::Migration),
            Box::new(m20260801_000003_create_ticket_attachment_table::Migration),
            Box::new(m20260801_000004_create_ticket_question_table::Migration),
            Box::new(m20260802_000005_create_ticket_indexes::Migration),
        ]
    }
}
