//! On-demand statistics rollups.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::data::stats::StatsRepository;
use crate::error::AppError;
use crate::model::stats::TicketStats;

/// Closed tickets sampled for the duration averages.
const DURATION_SAMPLE: u64 = 200;

/// Service computing reporting rollups over the ticket store.
pub struct StatsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes a statistics snapshot.
    ///
    /// # Arguments
    /// - `window` - Lookback window for the created-ticket count
    ///
    /// # Returns
    /// - `Ok(TicketStats)` - Snapshot over the full collection
    /// - `Err(AppError)` - Database error
    pub async fn snapshot(&self, window: Duration) -> Result<TicketStats, AppError> {
        let repo = StatsRepository::new(self.db);

        let by_status = repo.count_by_status().await?;
        let by_priority = repo.count_by_priority().await?;
        let created_in_window = repo.created_since(Utc::now() - window).await?;
        let rating_counts = repo.rating_counts().await?;

        let closed = repo.recently_closed(DURATION_SAMPLE).await?;

        let mut resolution_samples = Vec::with_capacity(closed.len());
        let mut response_samples = Vec::new();
        for ticket in &closed {
            if let Some(closed_at) = ticket.closed_at {
                resolution_samples.push((closed_at - ticket.created_at).num_seconds() as f64);
            }
            if let Some(first_response) = repo
                .first_response_at(ticket.ticket_id, &ticket.user_id)
                .await?
            {
                response_samples.push((first_response - ticket.created_at).num_seconds() as f64);
            }
        }

        Ok(TicketStats {
            by_status,
            by_priority,
            created_in_window,
            avg_first_response_secs: mean(&response_samples),
            avg_resolution_secs: mean(&resolution_samples),
            rating_counts,
        })
    }
}

fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn mean_averages_samples() {
        assert_eq!(mean(&[10.0, 20.0, 30.0]), Some(20.0));
    }
}
