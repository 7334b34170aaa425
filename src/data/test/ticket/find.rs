use super::*;

/// Tests lookup by ticket id.
///
/// Expected: Some for an existing id, None otherwise
#[tokio::test]
async fn finds_by_ticket_id() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let found = repo.find_by_ticket_id(ticket.ticket_id).await?;
    assert_eq!(found.map(|t| t.ticket_id), Some(ticket.ticket_id));

    assert!(repo.find_by_ticket_id(999_999).await?.is_none());

    Ok(())
}

/// Tests lookup by bound channel.
///
/// Expected: Some for a ticket channel, None for an unrelated channel
#[tokio::test]
async fn finds_by_channel_id() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let found = repo.find_by_channel_id(&ticket.channel_id).await?;
    assert_eq!(found.map(|t| t.ticket_id), Some(ticket.ticket_id));

    assert!(repo.find_by_channel_id("1").await?.is_none());

    Ok(())
}

/// Tests the MaxTickets counting rule.
///
/// Expected: open and closed tickets count, deleted ones do not
#[tokio::test]
async fn counts_only_undeleted_tickets() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = "424242";
    factory::ticket::TicketFactory::new(db).user_id(user).build().await?;
    factory::ticket::TicketFactory::new(db)
        .user_id(user)
        .status("closed")
        .build()
        .await?;
    factory::ticket::TicketFactory::new(db)
        .user_id(user)
        .status("deleted")
        .build()
        .await?;
    factory::ticket::create_ticket(db).await?; // someone else's

    let repo = TicketRepository::new(db);
    assert_eq!(repo.count_undeleted_for_user(424242).await?, 2);

    Ok(())
}
