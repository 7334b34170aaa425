//! Ticket settings and type catalog.
//!
//! Global ticket behavior and the per-type catalog are loaded once at startup
//! from a YAML document. The catalog maps a type key (e.g. `"support"`) to the
//! channel category, support roles, naming templates and per-type toggles the
//! lifecycle engine consults on every operation.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::Deserialize;

use crate::error::{config::ConfigError, ticket::TicketError, AppError};

/// Global ticket settings plus the ticket-type catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Cap on concurrently open-or-closed (not yet deleted) tickets per user.
    #[serde(default = "default_max_tickets")]
    pub max_tickets: u32,

    /// Seconds between the deletion countdown notice and the actual channel
    /// removal. Zero deletes immediately.
    #[serde(default)]
    pub deletion_countdown_secs: u64,

    /// User IDs barred from creating tickets.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Moderation-log channel receiving closure summaries.
    #[serde(default)]
    pub log_channel: Option<String>,

    #[serde(default)]
    pub alert: AlertSettings,

    #[serde(default)]
    pub priority: PrioritySettings,

    #[serde(default)]
    pub working_hours: WorkingHoursSettings,

    #[serde(default)]
    pub transcript: TranscriptSettings,

    #[serde(default)]
    pub closure_dm: ClosureDmSettings,

    #[serde(default)]
    pub reviews: ReviewSettings,

    /// Ticket-type catalog keyed by type key.
    #[serde(default)]
    pub types: BTreeMap<String, TicketTypeConfig>,
}

/// Inactivity alert behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds granted to the ticket owner after an alert is posted before
    /// the scheduler escalates.
    #[serde(default = "default_alert_secs")]
    pub time_secs: u64,
    /// Whether the alerted user is also notified by DM.
    #[serde(default)]
    pub dm_user: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            time_secs: default_alert_secs(),
            dm_user: false,
        }
    }
}

/// Priority levels and change throttling.
#[derive(Debug, Clone, Deserialize)]
pub struct PrioritySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_priority_levels")]
    pub levels: Vec<PriorityLevel>,
    #[serde(default = "default_priority_name")]
    pub default_priority: String,
    /// Minimum seconds between priority changes on the same ticket.
    #[serde(default = "default_priority_cooldown")]
    pub cooldown_secs: u64,
}

impl Default for PrioritySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            levels: default_priority_levels(),
            default_priority: default_priority_name(),
            cooldown_secs: default_priority_cooldown(),
        }
    }
}

/// One configurable priority level.
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityLevel {
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
    /// Whether channels at this priority are repositioned to the top of
    /// their category.
    #[serde(default)]
    pub move_to_top: bool,
}

/// Working-hours restriction on ticket creation.
///
/// The schedule maps lowercase three-letter weekday keys (`mon`..`sun`) to an
/// `HH:MM-HH:MM` range in the configured fixed UTC offset. Days without an
/// entry are closed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkingHoursSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub schedule: BTreeMap<String, String>,
    /// Allows support-role holders to create tickets outside working hours.
    #[serde(default)]
    pub allow_override: bool,
}

impl WorkingHoursSettings {
    /// Whether ticket creation is currently allowed.
    ///
    /// # Arguments
    /// - `now` - Current UTC time
    ///
    /// # Returns
    /// - `Ok(true)` - Within working hours, or the restriction is disabled
    /// - `Ok(false)` - Outside working hours
    /// - `Err(ConfigError::InvalidWorkingHours)` - Malformed schedule entry
    pub fn is_within(&self, now: DateTime<Utc>) -> Result<bool, ConfigError> {
        if !self.enabled {
            return Ok(true);
        }

        let local = now + Duration::minutes(self.utc_offset_minutes as i64);
        let key = weekday_key(local.weekday());

        let Some(range) = self.schedule.get(key) else {
            return Ok(false);
        };

        let (start, end) = parse_time_range(range)?;
        let time = local.time();

        Ok(time >= start && time < end)
    }
}

/// Transcript generation behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSettings {
    /// Whether transcripts are generated at all.
    #[serde(default = "default_true")]
    pub save: bool,
    #[serde(default)]
    pub mode: TranscriptMode,
    /// Tickets with fewer recorded messages produce no transcript.
    #[serde(default = "default_min_messages")]
    pub min_messages: u32,
    /// Directory for text transcripts.
    #[serde(default = "default_save_path")]
    pub save_path: String,
    /// Deep-link template for web mode, with `{guild}`/`{ticket}`/`{channel}`
    /// placeholders.
    #[serde(default)]
    pub web_url_template: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            save: true,
            mode: TranscriptMode::Text,
            min_messages: default_min_messages(),
            save_path: default_save_path(),
            web_url_template: String::new(),
        }
    }
}

/// Transcript rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptMode {
    /// Flat chronological text file attached to the log message.
    #[default]
    Text,
    /// Deep link to an externally hosted transcript viewer, no local file.
    Web,
}

/// Closure DM behavior.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosureDmSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Whether the transcript is attached to the closure DM.
    #[serde(default)]
    pub attach_transcript: bool,
    /// Post an in-channel notice when the DM cannot be delivered.
    #[serde(default)]
    pub notify_failure_in_channel: bool,
}

/// Review / rating prompts sent with the closure DM.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Whether low ratings prompt for written feedback.
    #[serde(default)]
    pub ask_why: bool,
}

/// Per-type catalog entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TicketTypeConfig {
    /// Display name shown in embeds.
    pub name: String,

    /// Roles granted full access to tickets of this type.
    #[serde(default)]
    pub support_roles: Vec<String>,

    /// Roles a user must hold to open this type; empty means anyone.
    #[serde(default)]
    pub user_roles: Vec<String>,

    /// Category the live ticket channels are created under.
    pub category_id: String,

    /// Category closed channels are moved to. When absent, closing a ticket
    /// deletes it instead of archiving.
    #[serde(default)]
    pub archive_category: Option<String>,

    /// Channel name template (`{id}`/`{type}`/`{priority}`/`{username}`).
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Channel topic template.
    #[serde(default)]
    pub channel_topic: String,

    /// Message posted in the fresh channel after the info embed.
    #[serde(default)]
    pub opening_message: Option<String>,

    /// Questions answered during the creation flow.
    #[serde(default)]
    pub questions: Vec<String>,

    #[serde(default)]
    pub claiming: ClaimingSettings,

    /// Restricts Delete to support-role holders.
    #[serde(default)]
    pub restrict_deletion: bool,

    /// Restricts Close to support-role holders.
    #[serde(default)]
    pub restrict_closing: bool,

    /// Tag the support roles on creation (tag message is removed right away).
    #[serde(default)]
    pub tag_support: bool,

    /// Tag the creator on creation (tag message is removed right away).
    #[serde(default)]
    pub tag_creator: bool,

    /// Arms an inactivity alert this many seconds after creation.
    #[serde(default)]
    pub auto_alert_secs: Option<u64>,
}

/// Claim button behavior for a type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClaimingSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_claim_label")]
    pub button_label: String,
}

impl Default for ClaimingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            button_label: default_claim_label(),
        }
    }
}

impl Settings {
    /// Loads and validates settings from a YAML file.
    ///
    /// # Arguments
    /// - `path` - Path to the settings document
    ///
    /// # Returns
    /// - `Ok(Settings)` - Parsed and validated settings
    /// - `Err(AppError::ConfigErr)` - File unreadable, malformed, or invalid
    pub fn from_yaml(path: &str) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadSettings {
            path: path.to_string(),
            source: e,
        })?;

        let settings: Settings =
            serde_yaml::from_str(&raw).map_err(|e| ConfigError::ParseSettings {
                path: path.to_string(),
                source: e,
            })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validates cross-field constraints the type system cannot express.
    ///
    /// # Returns
    /// - `Ok(())` - Settings are coherent
    /// - `Err(ConfigError)` - Default priority unknown or schedule malformed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.priority.enabled
            && !self
                .priority
                .levels
                .iter()
                .any(|l| l.name == self.priority.default_priority)
        {
            return Err(ConfigError::UnknownDefaultPriority(
                self.priority.default_priority.clone(),
            ));
        }

        for range in self.working_hours.schedule.values() {
            parse_time_range(range)?;
        }

        Ok(())
    }

    /// Looks up a catalog entry by type key.
    ///
    /// # Arguments
    /// - `key` - Ticket type key
    ///
    /// # Returns
    /// - `Ok(&TicketTypeConfig)` - Catalog entry
    /// - `Err(TicketError::UnknownType)` - Key not in the catalog
    pub fn ticket_type(&self, key: &str) -> Result<&TicketTypeConfig, TicketError> {
        self.types
            .get(key)
            .ok_or_else(|| TicketError::UnknownType(key.to_string()))
    }

    /// Whether the user is barred from creating tickets.
    pub fn is_blacklisted(&self, user_id: u64) -> bool {
        let id = user_id.to_string();
        self.blacklist.iter().any(|entry| *entry == id)
    }

    /// Looks up a priority level by name.
    ///
    /// # Returns
    /// - `Ok(&PriorityLevel)` - Configured level
    /// - `Err(TicketError::UnknownPriority)` - Name not configured
    pub fn priority_level(&self, name: &str) -> Result<&PriorityLevel, TicketError> {
        self.priority
            .levels
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| TicketError::UnknownPriority(name.to_string()))
    }
}

fn weekday_key(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn parse_time_range(range: &str) -> Result<(NaiveTime, NaiveTime), ConfigError> {
    let invalid = || ConfigError::InvalidWorkingHours(range.to_string());

    let (start, end) = range.split_once('-').ok_or_else(invalid)?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;

    Ok((start, end))
}

fn default_max_tickets() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_alert_secs() -> u64 {
    86_400
}

fn default_priority_levels() -> Vec<PriorityLevel> {
    ["Low", "Medium", "High"]
        .into_iter()
        .map(|name| PriorityLevel {
            name: name.to_string(),
            emoji: None,
            move_to_top: name == "High",
        })
        .collect()
}

fn default_priority_name() -> String {
    "Medium".to_string()
}

fn default_priority_cooldown() -> u64 {
    60
}

fn default_min_messages() -> u32 {
    3
}

fn default_save_path() -> String {
    "transcripts".to_string()
}

fn default_channel_name() -> String {
    "ticket-{id}".to_string()
}

fn default_claim_label() -> String {
    "Claim".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"
max_tickets: 2
deletion_countdown_secs: 10
log_channel: "700100200300400500"
blacklist:
  - "111"
alert:
  enabled: true
  time_secs: 3600
priority:
  default_priority: Low
  cooldown_secs: 30
working_hours:
  enabled: true
  utc_offset_minutes: 60
  schedule:
    mon: "09:00-17:00"
    tue: "09:00-17:00"
transcript:
  mode: web
  min_messages: 2
  web_url_template: "https://tickets.example.com/{guild}/{ticket}"
types:
  support:
    name: Support
    category_id: "800100200300400500"
    archive_category: "800100200300400501"
    support_roles: ["600100200300400500"]
    channel_name: "{priority}-ticket-{id}"
    questions:
      - "What do you need help with?"
    claiming:
      enabled: true
      button_label: Claim
    auto_alert_secs: 7200
"#;

    #[test]
    fn parses_sample_document() {
        let settings: Settings = serde_yaml::from_str(SAMPLE).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.max_tickets, 2);
        assert!(settings.is_blacklisted(111));
        assert!(!settings.is_blacklisted(222));
        assert_eq!(settings.priority.default_priority, "Low");
        assert_eq!(settings.transcript.mode, TranscriptMode::Web);

        let support = settings.ticket_type("support").unwrap();
        assert_eq!(support.name, "Support");
        assert!(support.claiming.enabled);
        assert_eq!(support.auto_alert_secs, Some(7200));
        assert_eq!(support.questions.len(), 1);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let settings: Settings = serde_yaml::from_str(SAMPLE).unwrap();

        assert_eq!(
            settings.ticket_type("billing"),
            Err(TicketError::UnknownType("billing".to_string()))
        );
    }

    #[test]
    fn unknown_default_priority_fails_validation() {
        let settings: Settings =
            serde_yaml::from_str("priority:\n  default_priority: Critical\n").unwrap();

        assert!(matches!(
            settings.validate(),
            Err(ConfigError::UnknownDefaultPriority(_))
        ));
    }

    #[test]
    fn malformed_working_hours_fail_validation() {
        let settings: Settings = serde_yaml::from_str(
            "working_hours:\n  enabled: true\n  schedule:\n    mon: \"9am-5pm\"\n",
        )
        .unwrap();

        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidWorkingHours(_))
        ));
    }

    #[test]
    fn working_hours_respect_offset_and_bounds() {
        let settings: Settings = serde_yaml::from_str(SAMPLE).unwrap();
        let hours = &settings.working_hours;

        // Monday 08:30 UTC is 09:30 local at +60 minutes: inside.
        let inside = Utc.with_ymd_and_hms(2026, 8, 3, 8, 30, 0).unwrap();
        assert!(hours.is_within(inside).unwrap());

        // Monday 16:30 UTC is 17:30 local: outside.
        let outside = Utc.with_ymd_and_hms(2026, 8, 3, 16, 30, 0).unwrap();
        assert!(!hours.is_within(outside).unwrap());

        // Sunday has no schedule entry: closed.
        let sunday = Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap();
        assert!(!hours.is_within(sunday).unwrap());
    }

    #[test]
    fn disabled_working_hours_always_allow() {
        let hours = WorkingHoursSettings::default();

        assert!(hours.is_within(Utc::now()).unwrap());
    }

    #[test]
    fn defaults_apply_to_empty_document() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.max_tickets, 3);
        assert!(settings.alert.enabled);
        assert_eq!(settings.priority.levels.len(), 3);
        assert_eq!(settings.transcript.min_messages, 3);
        assert!(settings.types.is_empty());
    }
}
