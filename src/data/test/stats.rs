use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

use crate::data::stats::StatsRepository;

/// Tests the per-status rollup.
///
/// Expected: every status key present, zero counts included
#[tokio::test]
async fn counts_by_status_include_zero_entries() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::create_ticket(db).await?;
    factory::ticket::create_ticket(db).await?;
    factory::ticket::TicketFactory::new(db)
        .status("closed")
        .build()
        .await?;

    let repo = StatsRepository::new(db);
    let counts = repo.count_by_status().await?;

    assert_eq!(counts["open"], 2);
    assert_eq!(counts["closed"], 1);
    assert_eq!(counts["deleting"], 0);
    assert_eq!(counts["deleted"], 0);

    Ok(())
}

/// Tests the per-priority rollup.
///
/// Expected: deleted tickets are excluded
#[tokio::test]
async fn counts_by_priority_exclude_deleted() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::TicketFactory::new(db)
        .priority("High")
        .build()
        .await?;
    factory::ticket::TicketFactory::new(db)
        .priority("High")
        .build()
        .await?;
    factory::ticket::TicketFactory::new(db)
        .priority("Low")
        .status("deleted")
        .build()
        .await?;

    let repo = StatsRepository::new(db);
    let counts = repo.count_by_priority().await?;

    assert_eq!(counts.get("High"), Some(&2));
    assert_eq!(counts.get("Low"), None);

    Ok(())
}

/// Tests the created-since window count.
///
/// Expected: only tickets inside the window are counted
#[tokio::test]
async fn created_since_respects_the_window() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::create_ticket(db).await?;
    factory::ticket::TicketFactory::new(db)
        .created_at(Utc::now() - Duration::days(30))
        .build()
        .await?;

    let repo = StatsRepository::new(db);

    assert_eq!(repo.created_since(Utc::now() - Duration::days(7)).await?, 1);
    assert_eq!(repo.created_since(Utc::now() - Duration::days(60)).await?, 2);

    Ok(())
}

/// Tests the rating distribution.
///
/// Expected: unrated tickets are excluded, counts keyed by the star string
#[tokio::test]
async fn rating_counts_group_by_star_string() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::TicketFactory::new(db)
        .rating(Some("5".to_string()))
        .build()
        .await?;
    factory::ticket::TicketFactory::new(db)
        .rating(Some("5".to_string()))
        .build()
        .await?;
    factory::ticket::TicketFactory::new(db)
        .rating(Some("2".to_string()))
        .build()
        .await?;
    factory::ticket::create_ticket(db).await?; // unrated

    let repo = StatsRepository::new(db);
    let counts = repo.rating_counts().await?;

    assert_eq!(counts.get("5"), Some(&2));
    assert_eq!(counts.get("2"), Some(&1));
    assert_eq!(counts.len(), 2);

    Ok(())
}

/// Tests the first-response lookup.
///
/// Expected: the earliest non-creator message; None when only the creator wrote
#[tokio::test]
async fn first_response_skips_the_creator() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    factory::ticket_message::create_message(db, ticket.ticket_id, &ticket.user_id, "tester", "anyone?")
        .await?;
    let response = factory::ticket_message::create_message(
        db,
        ticket.ticket_id,
        "support-1",
        "Support",
        "on it",
    )
    .await?;

    let repo = StatsRepository::new(db);

    let first = repo
        .first_response_at(ticket.ticket_id, &ticket.user_id)
        .await?;
    assert_eq!(first, Some(response.sent_at));

    let lonely = factory::ticket::create_ticket(db).await?;
    factory::ticket_message::create_message(db, lonely.ticket_id, &lonely.user_id, "tester", "echo")
        .await?;
    assert!(repo
        .first_response_at(lonely.ticket_id, &lonely.user_id)
        .await?
        .is_none());

    Ok(())
}

/// Tests the recently-closed sample.
///
/// Expected: only tickets with a closure timestamp, newest first
#[tokio::test]
async fn recently_closed_orders_newest_first() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let older = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .closed_at(Some(Utc::now() - Duration::hours(2)))
        .build()
        .await?;
    let newer = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .closed_at(Some(Utc::now() - Duration::hours(1)))
        .build()
        .await?;
    factory::ticket::create_ticket(db).await?; // never closed

    let repo = StatsRepository::new(db);
    let closed = repo.recently_closed(10).await?;

    assert_eq!(closed.len(), 2);
    assert_eq!(closed[0].ticket_id, newer.ticket_id);
    assert_eq!(closed[1].ticket_id, older.ticket_id);

    Ok(())
}
