use super::*;

/// Tests the alert candidate query.
///
/// Expected: open tickets with a deadline or a posted alert are returned;
/// quiet open tickets and closed tickets are not
#[tokio::test]
async fn returns_open_tickets_with_alert_state() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let due = factory::ticket::TicketFactory::new(db)
        .alert_time(Some(Utc::now() - Duration::minutes(5)))
        .build()
        .await?;
    let posted = factory::ticket::TicketFactory::new(db)
        .alert_message_id(Some("777".to_string()))
        .build()
        .await?;
    let _quiet = factory::ticket::create_ticket(db).await?;
    let _closed = factory::ticket::TicketFactory::new(db)
        .status("closed")
        .alert_time(Some(Utc::now() - Duration::minutes(5)))
        .build()
        .await?;

    let repo = TicketRepository::new(db);
    let candidates = repo.open_with_alerts().await?;

    let ids: Vec<i64> = candidates.iter().map(|t| t.ticket_id).collect();
    assert!(ids.contains(&due.ticket_id));
    assert!(ids.contains(&posted.ticket_id));
    assert_eq!(ids.len(), 2);

    Ok(())
}

/// Tests arming and clearing the alert state.
///
/// Expected: set_alert stores all three fields, clear_alert wipes them
#[tokio::test]
async fn set_and_clear_alert_round_trip() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::ticket::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let deadline = Utc::now() + Duration::hours(1);
    repo.set_alert(ticket.ticket_id, deadline, "No recent activity", Some("777"))
        .await?;

    let armed = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert_eq!(armed.alert_time, Some(deadline));
    assert_eq!(armed.alert_reason, Some("No recent activity".to_string()));
    assert_eq!(armed.alert_message_id, Some("777".to_string()));

    repo.clear_alert(ticket.ticket_id).await?;

    let cleared = repo.find_by_ticket_id(ticket.ticket_id).await?.unwrap();
    assert!(cleared.alert_time.is_none());
    assert!(cleared.alert_reason.is_none());
    assert!(cleared.alert_message_id.is_none());

    Ok(())
}
