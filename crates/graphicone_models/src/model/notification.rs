//! E-mail and push notification preferences.

use super::{FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Digest e-mail preference, one row per account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotification {
    pub username: String,
    pub push_notification_day: String,
    pub enable: bool,
}

impl EmailNotification {
    pub fn new(
        username: impl Into<String>,
        push_notification_day: impl Into<String>,
        enable: bool,
    ) -> Self {
        Self {
            username: username.into(),
            push_notification_day: push_notification_day.into(),
            enable,
        }
    }
}

impl Record for EmailNotification {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::EMAIL_NOTIFICATION;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.username.clone().into(),
            self.push_notification_day.clone().into(),
            self.enable.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            push_notification_day: row.get("push_notification_day")?,
            enable: row.get("enable")?,
        })
    }
}

/// Static catalog entry describing one push notification kind.
///
/// The `allowed_*` columns hold JSON arrays used as sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationType {
    #[serde(rename = "type")]
    pub kind: String,
    pub general_type: String,
    pub allowed_days: JsonValue,
    pub allowed_frequency: JsonValue,
    pub allowed_graph_count: JsonValue,
}

impl PushNotificationType {
    pub fn new(kind: impl Into<String>, general_type: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            general_type: general_type.into(),
            allowed_days: json!([]),
            allowed_frequency: json!([]),
            allowed_graph_count: json!([]),
        }
    }
}

impl Record for PushNotificationType {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::PUSH_NOTIFICATION_TYPES;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.kind.clone().into(),
            self.general_type.clone().into(),
            self.allowed_days.clone().into(),
            self.allowed_frequency.clone().into(),
            self.allowed_graph_count.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            kind: row.get("type")?,
            general_type: row.get("general_type")?,
            allowed_days: row.get("allowed_days")?,
            allowed_frequency: row.get("allowed_frequency")?,
            allowed_graph_count: row.get("allowed_graph_count")?,
        })
    }
}

/// Per-account setting for one push notification kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationSetting {
    pub username: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub frequency: String,
    pub notification_days: JsonValue,
    pub notification_graph_count: Option<i64>,
    /// `HH:MM`, defaults to `14:00`.
    pub notification_time: String,
    pub enable: bool,
}

impl PushNotificationSetting {
    pub fn new(
        username: impl Into<String>,
        kind: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            kind: kind.into(),
            frequency: frequency.into(),
            notification_days: json!([]),
            notification_graph_count: None,
            notification_time: "14:00".to_string(),
            enable: true,
        }
    }
}

impl Record for PushNotificationSetting {
    /// `(username, type)`.
    type Key = (String, String);
    const TABLE: &'static TableDef = &catalog::PUSH_NOTIFICATION_SETTINGS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.username.clone().into(),
            self.kind.clone().into(),
            self.frequency.clone().into(),
            self.notification_days.clone().into(),
            self.notification_graph_count.into(),
            self.notification_time.clone().into(),
            self.enable.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            kind: row.get("type")?,
            frequency: row.get("frequency")?,
            notification_days: row.get("notification_days")?,
            notification_graph_count: row.get("notification_graph_count")?,
            notification_time: row.get("notification_time")?,
            enable: row.get("enable")?,
        })
    }
}
