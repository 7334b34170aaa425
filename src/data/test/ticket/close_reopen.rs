use super::*;

/// Tests closing an open ticket.
///
/// Expected: status closed with reason and timestamp, alert state cleared
#[tokio::test]
async fn close_records_reason_and_clears_alert() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .alert_time(Some(Utc::now()))
        .alert_message_id(Some("777".to_string()))
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(
        repo.close(ticket.ticket_id, Some("Resolved"), Some("All sorted"))
            .await?
    );

    let closed = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(closed.status, TicketStatus::Closed);
    assert!(closed.closed_at.is_some());
    assert_eq!(closed.close_reason, Some("Resolved".to_string()));
    assert_eq!(closed.custom_close_reason, Some("All sorted".to_string()));
    assert!(closed.alert_time.is_none());
    assert!(closed.alert_message_id.is_none());

    Ok(())
}

/// Tests that close is conditional on the open state.
///
/// Expected: closing a closed ticket reports no transition
#[tokio::test]
async fn close_requires_an_open_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.close(ticket.ticket_id, None, None).await?);

    Ok(())
}

/// Tests reopening a closed ticket.
///
/// Expected: status open again with closure metadata cleared
#[tokio::test]
async fn reopen_restores_the_open_state() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.close(ticket.ticket_id, Some("Resolved"), None).await?);
    assert!(repo.reopen(ticket.ticket_id).await?);

    let reopened = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(reopened.status, TicketStatus::Open);
    assert!(reopened.closed_at.is_none());
    assert!(reopened.close_reason.is_none());
    assert!(reopened.archive_message_id.is_none());

    Ok(())
}

/// Tests that reopen is conditional on the closed state.
///
/// Expected: an open ticket cannot be reopened
#[tokio::test]
async fn reopen_requires_a_closed_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.reopen(ticket.ticket_id).await?);

    Ok(())
}

/// Tests priority persistence together with its cooldown timestamp.
///
/// Expected: both the level and the change time are stored
#[tokio::test]
async fn set_priority_records_the_change_time() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let changed_at = Utc::now();
    repo.set_priority(ticket.ticket_id, "High", changed_at).await?;

    let updated = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(updated.priority, "High");
    assert_eq!(updated.last_priority_change, Some(changed_at));

    Ok(())
}

/// Tests storing a closure review.
///
/// Expected: rating and feedback persisted
#[tokio::test]
async fn set_review_stores_rating_and_feedback() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    repo.set_review(ticket.ticket_id, "4", Some("Quick and friendly"))
        .await?;

    let reviewed = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(reviewed.rating, Some("4".to_string()));
    assert_eq!(
        reviewed.review_feedback,
        Some("Quick and friendly".to_string())
    );

    Ok(())
}
