//! Ticket question factory.

use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a question/answer pair for a ticket.
///
/// # Arguments
/// - `db` - Database connection
/// - `ticket_id` - Ticket the answers belong to
/// - `position` - Zero-based order of the question in the creation form
/// - `question` - Configured question text
/// - `answer` - Answer given by the creator
///
/// # Returns
/// - `Ok(entity::ticket_question::Model)` - Created question entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_question(
    db: &DatabaseConnection,
    ticket_id: i64,
    position: i32,
    question: &str,
    answer: &str,
) -> Result<entity::ticket_question::Model, DbErr> {
    entity::ticket_question::ActiveModel {
        ticket_id: ActiveValue::Set(ticket_id),
        position: ActiveValue::Set(position),
        question: ActiveValue::Set(question.to_string()),
        answer: ActiveValue::Set(answer.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}
