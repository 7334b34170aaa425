use super::*;

/// Tests search across message content.
///
/// Expected: the ticket whose history mentions the term is returned
#[tokio::test]
async fn matches_message_content() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    factory::ticket_message::create_message(
        db,
        ticket.ticket_id,
        "3",
        "alex",
        "the printer is on fire",
    )
    .await?;
    let _other = factory::ticket::create_ticket(db).await?;

    let repo = TicketRepository::new(db);
    let results = repo.search("printer", 10).await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ticket_id, ticket.ticket_id);

    Ok(())
}

/// Tests search across creator name and type key.
///
/// Expected: both fields match as infixes
#[tokio::test]
async fn matches_user_name_and_type() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let by_name = factory::ticket::TicketFactory::new(db)
        .user_id("1")
        .build()
        .await?;
    let by_type = factory::ticket::TicketFactory::new(db)
        .ticket_type("billing")
        .build()
        .await?;

    let repo = TicketRepository::new(db);

    let results = repo.search("testuser", 10).await?;
    assert!(results.iter().any(|t| t.ticket_id == by_name.ticket_id));

    let results = repo.search("billing", 10).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ticket_id, by_type.ticket_id);

    Ok(())
}

/// Tests a term with no matches.
///
/// Expected: empty result set
#[tokio::test]
async fn returns_empty_for_unknown_terms() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::create_ticket(db).await?;

    let repo = TicketRepository::new(db);
    assert!(repo.search("zebra", 10).await?.is_empty());

    Ok(())
}
