//! Channel rename throttling.
//!
//! Discord rate-limits channel-identity edits hard, so renames are serialized
//! behind a single global cooldown: one rename crosses the platform boundary
//! per window no matter how many tickets want one. Requests inside the window
//! are queued with at most one pending entry per channel (a newer request for
//! the same channel overwrites the queued one). A periodic tick drains the
//! queue oldest-first; transient failures retry up to a ceiling and are then
//! dropped with a log line.
//!
//! The throttler owns its state behind a mutex and takes both the clock and
//! the platform edge as dependencies, so tests drive it deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serenity::all::{ChannelId, EditChannel};
use serenity::http::Http;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::util::clock::Clock;

/// Global cooldown between renames.
const DEFAULT_COOLDOWN_SECS: i64 = 300;
/// Wait between retry attempts of a single rename.
const DEFAULT_RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(1);
/// Attempts per entry before it is dropped.
const MAX_ATTEMPTS: u32 = 3;

/// The platform edge the throttler pushes renames through.
#[async_trait]
pub trait ChannelRenamer: Send + Sync {
    async fn rename(
        &self,
        channel_id: u64,
        name: &str,
        topic: Option<&str>,
    ) -> Result<(), AppError>;
}

/// Production renamer backed by the Discord HTTP API.
///
/// Name and topic are applied in one channel edit, so the descriptive topic
/// regenerates together with the name.
pub struct HttpRenamer {
    http: Arc<Http>,
}

impl HttpRenamer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChannelRenamer for HttpRenamer {
    async fn rename(
        &self,
        channel_id: u64,
        name: &str,
        topic: Option<&str>,
    ) -> Result<(), AppError> {
        let mut edit = EditChannel::new().name(name);
        if let Some(topic) = topic {
            edit = edit.topic(topic);
        }

        ChannelId::new(channel_id).edit(&self.http, edit).await?;

        Ok(())
    }
}

/// One rename request from the lifecycle engine.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    pub channel_id: u64,
    pub name: String,
    /// Regenerated channel topic, applied together with the name.
    pub topic: Option<String>,
}

struct PendingRename {
    name: String,
    topic: Option<String>,
    queued_at: DateTime<Utc>,
    attempts: u32,
}

struct ThrottleState {
    last_rename: Option<DateTime<Utc>>,
    /// At most one entry per channel; last write wins.
    pending: HashMap<u64, PendingRename>,
    /// Serializes drain passes; no two renames are ever in flight at once.
    draining: bool,
}

/// Serializes and rate-limits channel renames.
pub struct RenameThrottler {
    renamer: Arc<dyn ChannelRenamer>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
    retry_delay: std::time::Duration,
    state: Mutex<ThrottleState>,
}

impl RenameThrottler {
    /// Creates a throttler with production timing.
    pub fn new(renamer: Arc<dyn ChannelRenamer>, clock: Arc<dyn Clock>) -> Self {
        Self::with_timing(
            renamer,
            clock,
            Duration::seconds(DEFAULT_COOLDOWN_SECS),
            DEFAULT_RETRY_DELAY,
        )
    }

    /// Creates a throttler with explicit timing, for tests.
    pub fn with_timing(
        renamer: Arc<dyn ChannelRenamer>,
        clock: Arc<dyn Clock>,
        cooldown: Duration,
        retry_delay: std::time::Duration,
    ) -> Self {
        Self {
            renamer,
            clock,
            cooldown,
            retry_delay,
            state: Mutex::new(ThrottleState {
                last_rename: None,
                pending: HashMap::new(),
                draining: false,
            }),
        }
    }

    /// Requests a rename: immediate when the window allows, queued otherwise.
    ///
    /// An immediate attempt retries up to the ceiling with a short delay; if
    /// it still fails the request is dropped (and logged), matching the drain
    /// path's ceiling behavior.
    pub async fn request(&self, request: RenameRequest) {
        let now = self.clock.now();

        {
            let mut state = self.state.lock().await;
            if state.draining || !self.cooldown_elapsed(&state, now) {
                state.pending.insert(
                    request.channel_id,
                    PendingRename {
                        name: request.name,
                        topic: request.topic,
                        queued_at: now,
                        attempts: 0,
                    },
                );
                return;
            }
            state.draining = true;
        }

        let ok = self
            .attempt_with_retries(request.channel_id, &request.name, request.topic.as_deref())
            .await;

        let mut state = self.state.lock().await;
        if ok {
            state.last_rename = Some(self.clock.now());
        } else {
            tracing::error!(
                "Dropping rename for channel {} after {} attempts",
                request.channel_id,
                MAX_ATTEMPTS
            );
        }
        state.draining = false;
    }

    /// Drains at most one queued rename, respecting the global cooldown.
    ///
    /// Called from a fixed-interval background loop. A failed attempt goes
    /// back into the queue with its attempt count bumped, unless a newer
    /// request already replaced it or the ceiling is reached.
    pub async fn tick(&self) {
        let (channel_id, mut entry) = {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            if state.draining || !self.cooldown_elapsed(&state, now) {
                return;
            }

            let Some(channel_id) = state
                .pending
                .iter()
                .min_by_key(|(_, e)| e.queued_at)
                .map(|(id, _)| *id)
            else {
                return;
            };

            let Some(entry) = state.pending.remove(&channel_id) else {
                return;
            };
            state.draining = true;
            (channel_id, entry)
        };

        let ok = self
            .renamer
            .rename(channel_id, &entry.name, entry.topic.as_deref())
            .await
            .is_ok();

        let mut state = self.state.lock().await;
        if ok {
            state.last_rename = Some(self.clock.now());
        } else {
            entry.attempts += 1;
            if entry.attempts >= MAX_ATTEMPTS {
                tracing::error!(
                    "Dropping rename for channel {} after {} attempts",
                    channel_id,
                    entry.attempts
                );
            } else if !state.pending.contains_key(&channel_id) {
                // Requeue unless a newer request already took the slot.
                state.pending.insert(channel_id, entry);
            }
        }
        state.draining = false;
    }

    /// Number of queued entries.
    pub async fn queue_len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    fn cooldown_elapsed(&self, state: &ThrottleState, now: DateTime<Utc>) -> bool {
        state
            .last_rename
            .map(|last| now - last >= self.cooldown)
            .unwrap_or(true)
    }

    async fn attempt_with_retries(
        &self,
        channel_id: u64,
        name: &str,
        topic: Option<&str>,
    ) -> bool {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.renamer.rename(channel_id, name, topic).await {
                Ok(()) => return true,
                Err(err) => {
                    tracing::warn!(
                        "Rename attempt {}/{} for channel {} failed: {}",
                        attempt,
                        MAX_ATTEMPTS,
                        channel_id,
                        err
                    );
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        false
    }
}
