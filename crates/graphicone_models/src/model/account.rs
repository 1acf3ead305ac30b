//! Accounts and the tables hanging off a username.
//!
//! # Invariants
//! - `username` is the immutable account identifier; `email` is unique.
//! - `follower`, `device_info` and `blocked_user` reference usernames without
//!   foreign keys, so those rows may outlive the account.
//! - `access_data` rows are never updated or deleted by this crate.

use super::{EpochMillis, FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Platform user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    /// Defaults to `{}`.
    pub interests: Option<JsonValue>,
    pub favorite: Option<JsonValue>,
    pub name: Option<String>,
    pub image_url: Option<JsonValue>,
    pub occupation: Option<String>,
    /// Filled with insert time when unset.
    pub join_date: Option<EpochMillis>,
    pub following_allow: Option<bool>,
    pub subscriptions: Option<JsonValue>,
    pub is_social_notification: Option<bool>,
}

impl Account {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: None,
            email: Some(email.into()),
            interests: Some(json!({})),
            favorite: None,
            name: None,
            image_url: None,
            occupation: None,
            join_date: None,
            following_allow: None,
            subscriptions: None,
            is_social_notification: None,
        }
    }
}

impl Record for Account {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::ACCOUNT;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.username.clone().into(),
            self.password_hash.clone().into(),
            self.email.clone().into(),
            self.interests.clone().into(),
            self.favorite.clone().into(),
            self.name.clone().into(),
            self.image_url.clone().into(),
            self.occupation.clone().into(),
            self.join_date.into(),
            self.following_allow.into(),
            self.subscriptions.clone().into(),
            self.is_social_notification.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            email: row.get("email")?,
            interests: row.get("interests")?,
            favorite: row.get("favorite")?,
            name: row.get("name")?,
            image_url: row.get("image_url")?,
            occupation: row.get("occupation")?,
            join_date: row.get("join_date")?,
            following_allow: row.get("following_allow")?,
            subscriptions: row.get("subscriptions")?,
            is_social_notification: row.get("is_social_notification")?,
        })
    }
}

/// One installed client, keyed by its push token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: Option<String>,
    /// Owning username; not a foreign key.
    pub username: Option<String>,
    pub locale_timestamp: Option<EpochMillis>,
    pub device_token: String,
}

impl Device {
    pub fn new(device_token: impl Into<String>) -> Self {
        Self {
            device_id: None,
            username: None,
            locale_timestamp: None,
            device_token: device_token.into(),
        }
    }
}

impl Record for Device {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::DEVICE;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.device_id.clone().into(),
            self.username.clone().into(),
            self.locale_timestamp.into(),
            self.device_token.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            device_id: row.get("device_id")?,
            username: row.get("username")?,
            locale_timestamp: row.get("locale_timestamp")?,
            device_token: row.get("device_token")?,
        })
    }
}

/// Directed follow edge from `follower` to `following`.
///
/// `fellow` marks a mutual edge; keeping the reverse row in sync is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follower {
    pub id: Option<i64>,
    pub follower: String,
    pub following: String,
    pub fellow: bool,
    pub accept_status: bool,
    pub timestamp: Option<EpochMillis>,
    pub declined: bool,
}

impl Follower {
    pub fn new(follower: impl Into<String>, following: impl Into<String>) -> Self {
        Self {
            id: None,
            follower: follower.into(),
            following: following.into(),
            fellow: false,
            accept_status: false,
            timestamp: None,
            declined: false,
        }
    }
}

impl Record for Follower {
    type Key = i64;
    const TABLE: &'static TableDef = &catalog::FOLLOWER;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.follower.clone().into(),
            self.following.clone().into(),
            self.fellow.into(),
            self.accept_status.into(),
            self.timestamp.into(),
            self.declined.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            follower: row.get("follower")?,
            following: row.get("following")?,
            fellow: row.get("fellow")?,
            accept_status: row.get("accept_status")?,
            timestamp: row.get("timestamp")?,
            declined: row.get("declined")?,
        })
    }
}

/// Directed block edge: `username` blocks `blocked_username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedUser {
    pub id: Option<i64>,
    pub username: String,
    pub blocked_username: String,
}

impl BlockedUser {
    pub fn new(username: impl Into<String>, blocked_username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            blocked_username: blocked_username.into(),
        }
    }
}

impl Record for BlockedUser {
    type Key = i64;
    const TABLE: &'static TableDef = &catalog::BLOCKED_USER;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.username.clone().into(),
            self.blocked_username.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            blocked_username: row.get("blocked_username")?,
        })
    }
}

/// One-time password issued for account recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryPass {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    pub temp_pass: String,
    /// Defaults to insert time plus one day.
    pub valid_until: Option<EpochMillis>,
}

impl TemporaryPass {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        temp_pass: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            temp_pass: temp_pass.into(),
            valid_until: None,
        }
    }

    /// Whether the pass is still usable at `now_ms`.
    ///
    /// An unpersisted pass without an explicit expiry is not yet valid.
    pub fn is_valid_at(&self, now_ms: EpochMillis) -> bool {
        self.valid_until.is_some_and(|until| now_ms <= until)
    }
}

impl Record for TemporaryPass {
    type Key = i64;
    const TABLE: &'static TableDef = &catalog::TEMPORARY_PASS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.username.clone().into(),
            self.email.clone().into(),
            self.temp_pass.clone().into(),
            self.valid_until.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            temp_pass: row.get("temp_pass")?,
            valid_until: row.get("valid_until")?,
        })
    }
}

/// Append-only audit entry for sign-in activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessData {
    pub id: Option<i64>,
    pub username: String,
    pub login_timestamp: Option<EpochMillis>,
    pub logout_timestamp: Option<EpochMillis>,
    pub password_change_timestamp: Option<EpochMillis>,
}

impl AccessData {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            login_timestamp: None,
            logout_timestamp: None,
            password_change_timestamp: None,
        }
    }

    pub fn login(username: impl Into<String>, at: EpochMillis) -> Self {
        Self {
            login_timestamp: Some(at),
            ..Self::new(username)
        }
    }

    pub fn logout(username: impl Into<String>, at: EpochMillis) -> Self {
        Self {
            logout_timestamp: Some(at),
            ..Self::new(username)
        }
    }

    pub fn password_change(username: impl Into<String>, at: EpochMillis) -> Self {
        Self {
            password_change_timestamp: Some(at),
            ..Self::new(username)
        }
    }
}

impl Record for AccessData {
    type Key = i64;
    const TABLE: &'static TableDef = &catalog::ACCESS_DATA;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.username.clone().into(),
            self.login_timestamp.into(),
            self.logout_timestamp.into(),
            self.password_change_timestamp.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            login_timestamp: row.get("login_timestamp")?,
            logout_timestamp: row.get("logout_timestamp")?,
            password_change_timestamp: row.get("password_change_timestamp")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessData, TemporaryPass};

    #[test]
    fn temporary_pass_expires_after_valid_until() {
        let mut pass = TemporaryPass::new("alice", "alice@x.com", "1234");
        assert!(!pass.is_valid_at(0));

        pass.valid_until = Some(1_000);
        assert!(pass.is_valid_at(999));
        assert!(pass.is_valid_at(1_000));
        assert!(!pass.is_valid_at(1_001));
    }

    #[test]
    fn access_data_constructors_set_one_timestamp() {
        let entry = AccessData::logout("alice", 55);
        assert_eq!(entry.logout_timestamp, Some(55));
        assert_eq!(entry.login_timestamp, None);
        assert_eq!(entry.password_change_timestamp, None);
    }
}
