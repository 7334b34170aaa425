use super::*;

/// Tests that the claim guard is granted exactly once.
///
/// Expected: first acquisition succeeds, second fails while the guard is held
#[tokio::test]
async fn grants_the_claim_guard_once() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_claim(ticket.ticket_id, None).await?);
    assert!(!repo.try_begin_claim(ticket.ticket_id, None).await?);

    Ok(())
}

/// Tests two concurrent claim attempts on the same unclaimed ticket.
///
/// Expected: exactly one attempt wins the guard
#[tokio::test]
async fn concurrent_claims_have_one_winner() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let (first, second) = tokio::join!(
        repo.try_begin_claim(ticket.ticket_id, None),
        repo.try_begin_claim(ticket.ticket_id, None),
    );

    assert_ne!(first?, second?);

    Ok(())
}

/// Tests that committing a claim sets the claim state and releases the guard.
///
/// Expected: claimed=true with the winner recorded, guard free again
#[tokio::test]
async fn finish_claim_commits_and_releases_the_guard() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_claim(ticket.ticket_id, None).await?);
    repo.finish_claim(ticket.ticket_id, Some("555")).await?;

    let claimed = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert!(claimed.claimed);
    assert_eq!(claimed.claimed_by, Some("555".to_string()));

    // A claim attempt now fails, but the unclaim path for the holder works.
    assert!(!repo.try_begin_claim(ticket.ticket_id, None).await?);
    assert!(repo.try_begin_claim(ticket.ticket_id, Some("555")).await?);

    Ok(())
}

/// Tests the unclaim guard against the wrong claimer.
///
/// Expected: the guard is refused when the expected claimer does not match
#[tokio::test]
async fn unclaim_requires_the_matching_claimer() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .claimed_by(Some("555".to_string()))
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.try_begin_claim(ticket.ticket_id, Some("999")).await?);
    assert!(repo.try_begin_claim(ticket.ticket_id, Some("555")).await?);

    Ok(())
}

/// Tests that releasing the guard leaves the claim state untouched.
///
/// Expected: ticket still unclaimed, guard acquirable again
#[tokio::test]
async fn release_leaves_claim_state_unchanged() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.try_begin_claim(ticket.ticket_id, None).await?);
    repo.release_claim_guard(ticket.ticket_id).await?;

    let current = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert!(!current.claimed);
    assert!(current.claimed_by.is_none());

    assert!(repo.try_begin_claim(ticket.ticket_id, None).await?);

    Ok(())
}

/// Tests that the claim guard is limited to open tickets.
///
/// Expected: closed tickets refuse the guard
#[tokio::test]
async fn claim_guard_requires_an_open_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .build()
        .await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.try_begin_claim(ticket.ticket_id, None).await?);

    Ok(())
}
