use chrono::Utc;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::data::ticket::TicketRepository;
use crate::data::ticket_message::TicketMessageRepository;
use crate::model::message::{Attachment, RecordMessageParams};

/// Tests recording messages with attachments.
///
/// Expected: messages stored in order, attachments linked, message_count bumped
#[tokio::test]
async fn record_appends_and_increments_count() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketMessageRepository::new(db);

    repo.record(RecordMessageParams {
        ticket_id: ticket.ticket_id,
        author_id: 3,
        author_name: "alex".to_string(),
        content: "hello".to_string(),
        sent_at: Utc::now(),
        attachments: Vec::new(),
    })
    .await?;

    repo.record(RecordMessageParams {
        ticket_id: ticket.ticket_id,
        author_id: 4,
        author_name: "sam".to_string(),
        content: "screenshot attached".to_string(),
        sent_at: Utc::now(),
        attachments: vec![Attachment {
            file_name: "screenshot.png".to_string(),
            url: "https://cdn.example.com/screenshot.png".to_string(),
            content_type: Some("image/png".to_string()),
            data: Some(vec![1, 2, 3]),
        }],
    })
    .await?;

    let messages = repo.messages_for_ticket(ticket.ticket_id).await?;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].attachments.len(), 1);
    assert_eq!(messages[1].attachments[0].file_name, "screenshot.png");
    assert_eq!(messages[1].attachments[0].data, Some(vec![1, 2, 3]));

    let stored = TicketRepository::new(db)
        .find_by_ticket_id(ticket.ticket_id)
        .await?
        .unwrap();
    assert_eq!(stored.message_count, 2);

    Ok(())
}

/// Tests the per-ticket message count.
///
/// Expected: counts are scoped to the ticket
#[tokio::test]
async fn counts_are_scoped_per_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (ticket, _) = factory::helpers::create_ticket_with_messages(db, 3).await?;
    let other = factory::ticket::create_ticket(db).await?;

    let repo = TicketMessageRepository::new(db);
    assert_eq!(repo.count_for_ticket(ticket.ticket_id).await?, 3);
    assert_eq!(repo.count_for_ticket(other.ticket_id).await?, 0);

    Ok(())
}
