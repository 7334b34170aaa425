use super::*;

/// Tests that created tickets start open, unclaimed and unguarded.
///
/// Expected: Ok with the defaults of a fresh ticket
#[tokio::test]
async fn creates_open_unclaimed_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let id = repo.next_ticket_id().await?;
    let ticket = repo.create(id, params(111, 222)).await.unwrap();

    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(!ticket.claimed);
    assert!(ticket.claimed_by.is_none());
    assert_eq!(ticket.message_count, 0);
    assert!(ticket.closed_at.is_none());
    assert!(ticket.deleted_at.is_none());

    Ok(())
}

/// Tests that ids are unique and strictly increasing in assignment order.
///
/// Expected: each created ticket gets a larger id than the previous one
#[tokio::test]
async fn assigns_monotonically_increasing_ids() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);

    let mut previous = 0;
    for i in 0..5 {
        let id = repo.next_ticket_id().await?;
        let ticket = repo.create(id, params(100 + i, 200 + i)).await.unwrap();

        assert!(ticket.ticket_id > previous);
        previous = ticket.ticket_id;
    }

    Ok(())
}

/// Tests collision retry: creating with an already-taken id moves forward.
///
/// Expected: Ok with a fresh id strictly greater than the taken one,
/// never reusing it
#[tokio::test]
async fn retries_forward_on_id_collision() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let existing = factory::ticket::create_ticket(db).await?;

    let repo = TicketRepository::new(db);
    let ticket = repo
        .create(existing.ticket_id, params(111, 333))
        .await
        .unwrap();

    assert!(ticket.ticket_id > existing.ticket_id);

    Ok(())
}

/// Tests that creation answers are persisted in form order.
///
/// Expected: questions_for_ticket returns the pairs in the order given
#[tokio::test]
async fn persists_questions_in_order() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let id = repo.next_ticket_id().await?;

    let mut create = params(111, 222);
    create.questions = vec![
        ("What broke?".to_string(), "The printer".to_string()),
        ("Since when?".to_string(), "Yesterday".to_string()),
    ];

    let ticket = repo.create(id, create).await.unwrap();
    let questions = repo.questions_for_ticket(ticket.ticket_id).await?;

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].0, "What broke?");
    assert_eq!(questions[0].1, "The printer");
    assert_eq!(questions[1].0, "Since when?");

    Ok(())
}
