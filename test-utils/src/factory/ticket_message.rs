//! Ticket message and attachment factories.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Creates a recorded ticket message.
///
/// # Arguments
/// - `db` - Database connection
/// - `ticket_id` - Ticket the message belongs to
/// - `author_id` - Discord ID of the author
/// - `author_name` - Display name of the author
/// - `content` - Message text
///
/// # Returns
/// - `Ok(entity::ticket_message::Model)` - Created message entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_message(
    db: &DatabaseConnection,
    ticket_id: i64,
    author_id: &str,
    author_name: &str,
    content: &str,
) -> Result<entity::ticket_message::Model, DbErr> {
    entity::ticket_message::ActiveModel {
        ticket_id: ActiveValue::Set(ticket_id),
        author_id: ActiveValue::Set(author_id.to_string()),
        author_name: ActiveValue::Set(author_name.to_string()),
        content: ActiveValue::Set(content.to_string()),
        sent_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Creates an attachment record for a message.
///
/// # Arguments
/// - `db` - Database connection
/// - `message_id` - Message the attachment belongs to
/// - `file_name` - Original attachment file name
/// - `url` - Discord CDN URL of the attachment
/// - `data` - Optional stored (compressed) bytes
///
/// # Returns
/// - `Ok(entity::ticket_attachment::Model)` - Created attachment entity
/// - `Err(DbErr)` - Database error during insert
pub async fn create_attachment(
    db: &DatabaseConnection,
    message_id: i32,
    file_name: &str,
    url: &str,
    data: Option<Vec<u8>>,
) -> Result<entity::ticket_attachment::Model, DbErr> {
    entity::ticket_attachment::ActiveModel {
        message_id: ActiveValue::Set(message_id),
        file_name: ActiveValue::Set(file_name.to_string()),
        url: ActiveValue::Set(url.to_string()),
        content_type: ActiveValue::Set(None),
        data: ActiveValue::Set(data),
        ..Default::default()
    }
    .insert(db)
    .await
}
