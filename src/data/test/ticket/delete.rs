use super::*;

/// Tests that open and closed tickets may enter the deleting state.
///
/// Expected: both transitions granted
#[tokio::test]
async fn open_and_closed_tickets_can_begin_deletion() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let open = factory::ticket::create_ticket(db).await?;
    let closed = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_delete(open.ticket_id).await?);
    assert!(repo.try_begin_delete(closed.ticket_id).await?);

    Ok(())
}

/// Tests the double-delete race: only one trigger owns the transition.
///
/// Expected: first attempt wins, second observes the changed guard
#[tokio::test]
async fn second_delete_attempt_loses() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_delete(ticket.ticket_id).await?);
    assert!(!repo.try_begin_delete(ticket.ticket_id).await?);

    Ok(())
}

/// Tests that finalizing clears claim and alert state.
///
/// Expected: status deleted with a timestamp, claim and alert wiped
#[tokio::test]
async fn mark_deleted_finalizes_and_clears_claim() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .claimed_by(Some("555".to_string()))
        .alert_time(Some(Utc::now()))
        .alert_message_id(Some("777".to_string()))
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_delete(ticket.ticket_id).await?);
    assert!(repo.mark_deleted(ticket.ticket_id).await?);

    let deleted = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(deleted.status, TicketStatus::Deleted);
    assert!(deleted.deleted_at.is_some());
    assert!(!deleted.claimed);
    assert!(deleted.claimed_by.is_none());
    assert!(deleted.alert_time.is_none());
    assert!(deleted.alert_message_id.is_none());

    Ok(())
}

/// Tests that finalization requires the deleting state.
///
/// Expected: an open ticket cannot jump straight to deleted
#[tokio::test]
async fn mark_deleted_requires_the_deleting_state() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.mark_deleted(ticket.ticket_id).await?);

    let current = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(current.status, TicketStatus::Open);

    Ok(())
}

/// Tests that deletion is a terminal, idempotent sink.
///
/// Expected: a second full delete pass neither errors nor re-deletes
#[tokio::test]
async fn deletion_is_terminal() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_delete(ticket.ticket_id).await?);
    assert!(repo.mark_deleted(ticket.ticket_id).await?);

    assert!(!repo.try_begin_delete(ticket.ticket_id).await?);
    assert!(!repo.mark_deleted(ticket.ticket_id).await?);

    let current = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(current.status, TicketStatus::Deleted);

    Ok(())
}

/// Tests self-healing for externally removed channels.
///
/// Expected: only the matching ticket flips to deleted; repeat is a no-op
#[tokio::test]
async fn mark_deleted_by_channel_targets_one_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let removed = factory::ticket::create_ticket(db).await?;
    let untouched = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.mark_deleted_by_channel(&removed.channel_id).await?);
    assert!(!repo.mark_deleted_by_channel(&removed.channel_id).await?);

    let gone = repo.find_by_ticket_id(removed.ticket_id).await?.unwrap();
    assert_eq!(gone.status, TicketStatus::Deleted);

    let alive = repo.find_by_ticket_id(untouched.ticket_id).await?.unwrap();
    assert_eq!(alive.status, TicketStatus::Open);

    Ok(())
}
