use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

use entity::ticket::Column;

use crate::error::{internal::InternalError, AppError};
use crate::model::ticket::{CreateTicketParams, Ticket, TicketStatus};

/// Attempts made to allocate a unique ticket id before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Repository providing database operations for the ticket store.
///
/// All status, claim and guard transitions are expressed as conditional
/// `UPDATE ... WHERE` statements whose `rows_affected` tells the caller
/// whether it won the transition. Plain read-modify-write is never used for
/// those fields.
pub struct TicketRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TicketRepository<'a> {
    /// Creates a new TicketRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `TicketRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes the next free ticket id.
    ///
    /// Ids increase monotonically and are never reused; the store keeps
    /// deleted tickets forever, so the maximum existing id is a safe floor.
    ///
    /// # Returns
    /// - `Ok(id)` - Next id to try
    /// - `Err(DbErr)` - Database error
    pub async fn next_ticket_id(&self) -> Result<i64, DbErr> {
        let latest = entity::prelude::Ticket::find()
            .order_by_desc(Column::TicketId)
            .one(self.db)
            .await?;

        Ok(latest.map(|t| t.ticket_id + 1).unwrap_or(1))
    }

    /// Persists a new open ticket and its creation answers.
    ///
    /// The insert is retried with a freshly allocated id when a concurrent
    /// creation wins the same id; the id only ever moves forward.
    ///
    /// # Arguments
    /// - `ticket_id` - Preferred id (usually from `next_ticket_id`)
    /// - `params` - Creation parameters, including the already-created channel id
    ///
    /// # Returns
    /// - `Ok(Ticket)` - The persisted ticket
    /// - `Err(AppError::Internal)` - Id allocation kept colliding
    /// - `Err(AppError::DbErr)` - Other database error
    pub async fn create(
        &self,
        ticket_id: i64,
        params: CreateTicketParams,
    ) -> Result<Ticket, AppError> {
        let mut candidate = ticket_id;

        for _ in 0..MAX_ID_ATTEMPTS {
            let insert = entity::ticket::ActiveModel {
                ticket_id: ActiveValue::Set(candidate),
                guild_id: ActiveValue::Set(params.guild_id.to_string()),
                channel_id: ActiveValue::Set(params.channel_id.to_string()),
                user_id: ActiveValue::Set(params.user_id.to_string()),
                user_name: ActiveValue::Set(params.user_name.clone()),
                ticket_type: ActiveValue::Set(params.ticket_type.clone()),
                priority: ActiveValue::Set(params.priority.clone()),
                status: ActiveValue::Set(TicketStatus::Open.as_str().to_string()),
                claimed: ActiveValue::Set(false),
                claimed_by: ActiveValue::Set(None),
                claim_guard: ActiveValue::Set(false),
                close_reason: ActiveValue::Set(None),
                custom_close_reason: ActiveValue::Set(None),
                closed_at: ActiveValue::Set(None),
                rating: ActiveValue::Set(None),
                review_feedback: ActiveValue::Set(None),
                alert_time: ActiveValue::Set(None),
                alert_reason: ActiveValue::Set(None),
                alert_message_id: ActiveValue::Set(None),
                first_message_id: ActiveValue::Set(None),
                archive_message_id: ActiveValue::Set(None),
                log_message_id: ActiveValue::Set(None),
                channel_topic: ActiveValue::Set(params.channel_topic.clone()),
                message_count: ActiveValue::Set(0),
                last_priority_change: ActiveValue::Set(None),
                created_at: ActiveValue::Set(Utc::now()),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(self.db)
            .await;

            match insert {
                Ok(model) => {
                    self.insert_questions(candidate, &params.questions).await?;

                    return Ok(Ticket::from_entity(model));
                }
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    let next = self.next_ticket_id().await?;
                    candidate = next.max(candidate + 1);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(InternalError::TicketIdAllocation {
            attempts: MAX_ID_ATTEMPTS,
        }
        .into())
    }

    async fn insert_questions(
        &self,
        ticket_id: i64,
        questions: &[(String, String)],
    ) -> Result<(), DbErr> {
        for (position, (question, answer)) in questions.iter().enumerate() {
            entity::ticket_question::ActiveModel {
                ticket_id: ActiveValue::Set(ticket_id),
                position: ActiveValue::Set(position as i32),
                question: ActiveValue::Set(question.clone()),
                answer: ActiveValue::Set(answer.clone()),
                ..Default::default()
            }
            .insert(self.db)
            .await?;
        }

        Ok(())
    }

    /// Gets a ticket's creation answers in form order.
    ///
    /// # Returns
    /// - `Ok(pairs)` - Question/answer pairs, ordered by position
    /// - `Err(DbErr)` - Database error
    pub async fn questions_for_ticket(
        &self,
        ticket_id: i64,
    ) -> Result<Vec<(String, String)>, DbErr> {
        let questions = entity::prelude::TicketQuestion::find()
            .filter(entity::ticket_question::Column::TicketId.eq(ticket_id))
            .order_by_asc(entity::ticket_question::Column::Position)
            .all(self.db)
            .await?;

        Ok(questions
            .into_iter()
            .map(|q| (q.question, q.answer))
            .collect())
    }

    /// Gets a ticket by its id.
    ///
    /// # Returns
    /// - `Ok(Some(Ticket))` - Ticket found
    /// - `Ok(None)` - No ticket with this id
    /// - `Err(DbErr)` - Database error
    pub async fn find_by_ticket_id(&self, ticket_id: i64) -> Result<Option<Ticket>, DbErr> {
        let ticket = entity::prelude::Ticket::find_by_id(ticket_id)
            .one(self.db)
            .await?;

        Ok(ticket.map(Ticket::from_entity))
    }

    /// Gets the ticket bound to a channel, if any.
    ///
    /// # Arguments
    /// - `channel_id` - Discord channel ID as string
    ///
    /// # Returns
    /// - `Ok(Some(Ticket))` - Channel maps to a ticket
    /// - `Ok(None)` - Not a ticket channel
    /// - `Err(DbErr)` - Database error
    pub async fn find_by_channel_id(&self, channel_id: &str) -> Result<Option<Ticket>, DbErr> {
        let ticket = entity::prelude::Ticket::find()
            .filter(Column::ChannelId.eq(channel_id))
            .one(self.db)
            .await?;

        Ok(ticket.map(Ticket::from_entity))
    }

    /// Counts a user's tickets that still count against the `MaxTickets` cap.
    ///
    /// Open and closed-but-undeleted tickets count; deleted ones do not.
    ///
    /// # Arguments
    /// - `user_id` - Discord user ID as u64
    ///
    /// # Returns
    /// - `Ok(count)` - Number of live tickets
    /// - `Err(DbErr)` - Database error
    pub async fn count_undeleted_for_user(&self, user_id: u64) -> Result<u64, DbErr> {
        entity::prelude::Ticket::find()
            .filter(Column::UserId.eq(user_id.to_string()))
            .filter(Column::Status.ne(TicketStatus::Deleted.as_str()))
            .count(self.db)
            .await
    }

    /// Gets open tickets the alert scheduler must look at.
    ///
    /// A ticket is a candidate when it has a pending alert deadline or an
    /// alert message already posted (whose own deadline may have passed).
    ///
    /// # Returns
    /// - `Ok(tickets)` - Alert candidates
    /// - `Err(DbErr)` - Database error
    pub async fn open_with_alerts(&self) -> Result<Vec<Ticket>, DbErr> {
        let tickets = entity::prelude::Ticket::find()
            .filter(Column::Status.eq(TicketStatus::Open.as_str()))
            .filter(
                Condition::any()
                    .add(Column::AlertTime.is_not_null())
                    .add(Column::AlertMessageId.is_not_null()),
            )
            .order_by_asc(Column::TicketId)
            .all(self.db)
            .await?;

        Ok(tickets.into_iter().map(Ticket::from_entity).collect())
    }

    /// Tries to acquire the claim guard for a claim or unclaim transition.
    ///
    /// Exactly one concurrent caller wins; the others observe `false` and
    /// surface an already-in-progress error. For a claim pass
    /// `expected_claimer = None` (the ticket must be unclaimed); for an
    /// unclaim pass the current claimer's id.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to lock
    /// - `expected_claimer` - Required current claimer, or None for unclaimed
    ///
    /// # Returns
    /// - `Ok(true)` - Guard acquired
    /// - `Ok(false)` - Guard already held, ticket not open, or claim state mismatch
    /// - `Err(DbErr)` - Database error
    pub async fn try_begin_claim(
        &self,
        ticket_id: i64,
        expected_claimer: Option<&str>,
    ) -> Result<bool, DbErr> {
        let mut update = entity::prelude::Ticket::update_many()
            .col_expr(Column::ClaimGuard, Expr::value(true))
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::ClaimGuard.eq(false))
            .filter(Column::Status.eq(TicketStatus::Open.as_str()));

        update = match expected_claimer {
            None => update.filter(Column::Claimed.eq(false)),
            Some(claimer) => update
                .filter(Column::Claimed.eq(true))
                .filter(Column::ClaimedBy.eq(claimer)),
        };

        Ok(update.exec(self.db).await?.rows_affected == 1)
    }

    /// Commits a claim transition and releases the guard in one update.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to update
    /// - `claimer` - New claimer id, or None to unclaim
    ///
    /// # Returns
    /// - `Ok(())` - Claim state committed
    /// - `Err(DbErr)` - Database error
    pub async fn finish_claim(
        &self,
        ticket_id: i64,
        claimer: Option<&str>,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::Claimed, Expr::value(claimer.is_some()))
            .col_expr(
                Column::ClaimedBy,
                Expr::value(claimer.map(|c| c.to_string())),
            )
            .col_expr(Column::ClaimGuard, Expr::value(false))
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Releases the claim guard without changing claim state.
    ///
    /// Used on error paths after `try_begin_claim` succeeded but the Discord
    /// side of the transition failed, leaving the record as it was.
    pub async fn release_claim_guard(&self, ticket_id: i64) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::ClaimGuard, Expr::value(false))
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Tries to move a ticket into the transient `deleting` state.
    ///
    /// Only `open` and `closed` tickets can enter; a second concurrent delete
    /// (or a delete racing a close) observes `false`.
    ///
    /// # Returns
    /// - `Ok(true)` - This caller owns the deletion
    /// - `Ok(false)` - Already deleting or deleted
    /// - `Err(DbErr)` - Database error
    pub async fn try_begin_delete(&self, ticket_id: i64) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(
                Column::Status,
                Expr::value(TicketStatus::Deleting.as_str()),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Status.is_in([
                TicketStatus::Open.as_str(),
                TicketStatus::Closed.as_str(),
            ]))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Marks a deleting ticket as terminally deleted.
    ///
    /// Clears claim and alert state so a deleted record can never read as
    /// claimed or alerting.
    ///
    /// # Returns
    /// - `Ok(true)` - Ticket finalized
    /// - `Ok(false)` - Ticket was not in `deleting`
    /// - `Err(DbErr)` - Database error
    pub async fn mark_deleted(&self, ticket_id: i64) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(Column::Status, Expr::value(TicketStatus::Deleted.as_str()))
            .col_expr(Column::DeletedAt, Expr::value(Some(Utc::now())))
            .col_expr(Column::Claimed, Expr::value(false))
            .col_expr(Column::ClaimedBy, Expr::value(Option::<String>::None))
            .col_expr(Column::ClaimGuard, Expr::value(false))
            .col_expr(
                Column::AlertTime,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(Column::AlertReason, Expr::value(Option::<String>::None))
            .col_expr(
                Column::AlertMessageId,
                Expr::value(Option::<String>::None),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Status.eq(TicketStatus::Deleting.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Closes an open ticket.
    ///
    /// Conditional on the ticket still being `open`; clears any pending alert
    /// so the scheduler stops watching it.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to close
    /// - `reason` - Configured close reason, if any
    /// - `custom_reason` - Free-text reason, if any
    ///
    /// # Returns
    /// - `Ok(true)` - Ticket closed
    /// - `Ok(false)` - Ticket was not open
    /// - `Err(DbErr)` - Database error
    pub async fn close(
        &self,
        ticket_id: i64,
        reason: Option<&str>,
        custom_reason: Option<&str>,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(Column::Status, Expr::value(TicketStatus::Closed.as_str()))
            .col_expr(Column::ClosedAt, Expr::value(Some(Utc::now())))
            .col_expr(
                Column::CloseReason,
                Expr::value(reason.map(|r| r.to_string())),
            )
            .col_expr(
                Column::CustomCloseReason,
                Expr::value(custom_reason.map(|r| r.to_string())),
            )
            .col_expr(
                Column::AlertTime,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(Column::AlertReason, Expr::value(Option::<String>::None))
            .col_expr(
                Column::AlertMessageId,
                Expr::value(Option::<String>::None),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Status.eq(TicketStatus::Open.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Reopens a closed ticket.
    ///
    /// Conditional on the ticket being `closed`; clears closure metadata and
    /// the archive-control message reference.
    ///
    /// # Returns
    /// - `Ok(true)` - Ticket reopened
    /// - `Ok(false)` - Ticket was not closed
    /// - `Err(DbErr)` - Database error
    pub async fn reopen(&self, ticket_id: i64) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(Column::Status, Expr::value(TicketStatus::Open.as_str()))
            .col_expr(
                Column::ClosedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(Column::CloseReason, Expr::value(Option::<String>::None))
            .col_expr(
                Column::CustomCloseReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                Column::ArchiveMessageId,
                Expr::value(Option::<String>::None),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Status.eq(TicketStatus::Closed.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Persists a priority change and its timestamp for the cooldown.
    pub async fn set_priority(
        &self,
        ticket_id: i64,
        priority: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::Priority, Expr::value(priority.to_string()))
            .col_expr(Column::LastPriorityChange, Expr::value(Some(changed_at)))
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Persists a transfer to a different ticket type.
    pub async fn set_ticket_type(&self, ticket_id: i64, ticket_type: &str) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::TicketType, Expr::value(ticket_type.to_string()))
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Arms or reschedules the inactivity alert.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to update
    /// - `alert_time` - Deadline at which the scheduler acts
    /// - `reason` - Reason shown in the alert embed
    /// - `message_id` - Posted alert message, if one exists yet
    pub async fn set_alert(
        &self,
        ticket_id: i64,
        alert_time: DateTime<Utc>,
        reason: &str,
        message_id: Option<&str>,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::AlertTime, Expr::value(Some(alert_time)))
            .col_expr(Column::AlertReason, Expr::value(Some(reason.to_string())))
            .col_expr(
                Column::AlertMessageId,
                Expr::value(message_id.map(|m| m.to_string())),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Clears alert state, returning the ticket to normal monitoring.
    pub async fn clear_alert(&self, ticket_id: i64) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(
                Column::AlertTime,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(Column::AlertReason, Expr::value(Option::<String>::None))
            .col_expr(
                Column::AlertMessageId,
                Expr::value(Option::<String>::None),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Stores the control-panel message id posted at creation.
    pub async fn set_first_message_id(
        &self,
        ticket_id: i64,
        message_id: &str,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(
                Column::FirstMessageId,
                Expr::value(Some(message_id.to_string())),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Stores the archive-control message id posted on archive.
    pub async fn set_archive_message_id(
        &self,
        ticket_id: i64,
        message_id: &str,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(
                Column::ArchiveMessageId,
                Expr::value(Some(message_id.to_string())),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Stores the moderation-log message id for later review updates.
    pub async fn set_log_message_id(&self, ticket_id: i64, message_id: &str) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(
                Column::LogMessageId,
                Expr::value(Some(message_id.to_string())),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Stores the owner's closure review.
    ///
    /// # Arguments
    /// - `ticket_id` - Ticket to update
    /// - `rating` - Star string selected by the owner
    /// - `feedback` - Optional written feedback
    pub async fn set_review(
        &self,
        ticket_id: i64,
        rating: &str,
        feedback: Option<&str>,
    ) -> Result<(), DbErr> {
        entity::prelude::Ticket::update_many()
            .col_expr(Column::Rating, Expr::value(Some(rating.to_string())))
            .col_expr(
                Column::ReviewFeedback,
                Expr::value(feedback.map(|f| f.to_string())),
            )
            .filter(Column::TicketId.eq(ticket_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Self-healing for externally removed channels.
    ///
    /// Marks whatever ticket was bound to the channel as terminally deleted,
    /// regardless of its previous lifecycle state.
    ///
    /// # Arguments
    /// - `channel_id` - Discord channel ID as string
    ///
    /// # Returns
    /// - `Ok(true)` - A ticket was finalized
    /// - `Ok(false)` - No live ticket was bound to the channel
    /// - `Err(DbErr)` - Database error
    pub async fn mark_deleted_by_channel(&self, channel_id: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::Ticket::update_many()
            .col_expr(Column::Status, Expr::value(TicketStatus::Deleted.as_str()))
            .col_expr(Column::DeletedAt, Expr::value(Some(Utc::now())))
            .col_expr(Column::Claimed, Expr::value(false))
            .col_expr(Column::ClaimedBy, Expr::value(Option::<String>::None))
            .col_expr(Column::ClaimGuard, Expr::value(false))
            .col_expr(
                Column::AlertTime,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(Column::AlertReason, Expr::value(Option::<String>::None))
            .col_expr(
                Column::AlertMessageId,
                Expr::value(Option::<String>::None),
            )
            .filter(Column::ChannelId.eq(channel_id))
            .filter(Column::Status.ne(TicketStatus::Deleted.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Searches tickets by message content, creator name or type.
    ///
    /// SQLite `LIKE` scan standing in for the source's full-text index.
    ///
    /// # Arguments
    /// - `term` - Search term, matched as an infix
    /// - `limit` - Maximum number of tickets returned
    ///
    /// # Returns
    /// - `Ok(tickets)` - Matching tickets, newest first
    /// - `Err(DbErr)` - Database error
    pub async fn search(&self, term: &str, limit: u64) -> Result<Vec<Ticket>, DbErr> {
        let pattern = format!("%{}%", term);

        let message_ticket_ids: Vec<i64> = entity::prelude::TicketMessage::find()
            .filter(entity::ticket_message::Column::Content.like(pattern.as_str()))
            .all(self.db)
            .await?
            .into_iter()
            .map(|m| m.ticket_id)
            .collect();

        let tickets = entity::prelude::Ticket::find()
            .filter(
                Condition::any()
                    .add(Column::TicketId.is_in(message_ticket_ids))
                    .add(Column::UserName.like(pattern.as_str()))
                    .add(Column::TicketType.like(pattern.as_str())),
            )
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(tickets.into_iter().map(Ticket::from_entity).collect())
    }
}
