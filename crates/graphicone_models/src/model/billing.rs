//! Subscriptions, spaces, trials and payment-provider state.
//!
//! # Invariants
//! - `subscription.price` is never negative (declared CHECK constraint).
//! - `payment` holds the latest provider state per user and is overwritten
//!   through upserts rather than appended to.

use super::{EpochMillis, FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Paid subscription owned by one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub username: String,
    pub name: String,
    pub link: String,
    pub description: String,
    /// References `board.id` without cascading.
    pub demo_board_id: Option<String>,
    pub purchase_id: Option<String>,
    pub subscription_folder_id: Option<String>,
    pub price: Option<f64>,
}

impl Subscription {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            link: String::new(),
            description: String::new(),
            demo_board_id: None,
            purchase_id: None,
            subscription_folder_id: None,
            price: None,
        }
    }
}

impl Record for Subscription {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::SUBSCRIPTION;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.username.clone().into(),
            self.name.clone().into(),
            self.link.clone().into(),
            self.description.clone().into(),
            self.demo_board_id.clone().into(),
            self.purchase_id.clone().into(),
            self.subscription_folder_id.clone().into(),
            self.price.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            name: row.get("name")?,
            link: row.get("link")?,
            description: row.get("description")?,
            demo_board_id: row.get("demo_board_id")?,
            purchase_id: row.get("purchase_id")?,
            subscription_folder_id: row.get("subscription_folder_id")?,
            price: row.get("price")?,
        })
    }
}

/// Content space unlocked by a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    /// Owning subscription's username.
    pub subscription: Option<String>,
    pub name: String,
    pub link_disable: String,
    pub link_active: String,
}

impl Space {
    pub fn new(id: impl Into<String>, subscription: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subscription: Some(subscription.into()),
            name: String::new(),
            link_disable: String::new(),
            link_active: String::new(),
        }
    }
}

impl Record for Space {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::SPACES;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.clone().into(),
            self.subscription.clone().into(),
            self.name.clone().into(),
            self.link_disable.clone().into(),
            self.link_active.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            subscription: row.get("subscription")?,
            name: row.get("name")?,
            link_disable: row.get("link_disable")?,
            link_active: row.get("link_active")?,
        })
    }
}

/// Free trial window for a subscription, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPeriod {
    pub username: String,
    /// Subscription name, not a foreign key.
    pub subscription: String,
    pub until_timestamp: EpochMillis,
}

impl TrialPeriod {
    pub fn new(
        username: impl Into<String>,
        subscription: impl Into<String>,
        until_timestamp: EpochMillis,
    ) -> Self {
        Self {
            username: username.into(),
            subscription: subscription.into(),
            until_timestamp,
        }
    }

    /// Whether the trial still runs at `now_ms`.
    pub fn is_active_at(&self, now_ms: EpochMillis) -> bool {
        now_ms <= self.until_timestamp
    }
}

impl Record for TrialPeriod {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::TRIAL_PERIODS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.username.clone().into(),
            self.subscription.clone().into(),
            self.until_timestamp.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get("username")?,
            subscription: row.get("subscription")?,
            until_timestamp: row.get("until_timestamp")?,
        })
    }
}

/// Latest store receipt state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub user_id: String,
    pub environment: Option<String>,
    pub notification_type: Option<String>,
    pub original_transaction_id: Option<String>,
    pub latest_expires_date: Option<EpochMillis>,
    pub is_subscribed: bool,
    pub will_auto_renew: Option<bool>,
    pub cancellation_date: Option<EpochMillis>,
    pub latest_receipt: Option<String>,
    pub latest_expired_receipt: Option<String>,
    pub transaction_id: Option<String>,
    pub auto_renew_product_id: Option<String>,
    pub promotional_offer_id: Option<String>,
    pub product_id: Option<String>,
    pub web_order_line_item_id: Option<String>,
    pub is_intro_period: Option<bool>,
    pub is_trial_period: Option<bool>,
    pub insert_timestamp: Option<EpochMillis>,
}

impl Payment {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            environment: None,
            notification_type: None,
            original_transaction_id: None,
            latest_expires_date: None,
            is_subscribed: true,
            will_auto_renew: None,
            cancellation_date: None,
            latest_receipt: None,
            latest_expired_receipt: None,
            transaction_id: None,
            auto_renew_product_id: None,
            promotional_offer_id: None,
            product_id: None,
            web_order_line_item_id: None,
            is_intro_period: None,
            is_trial_period: None,
            insert_timestamp: None,
        }
    }
}

impl Record for Payment {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::PAYMENT;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_id.clone().into(),
            self.environment.clone().into(),
            self.notification_type.clone().into(),
            self.original_transaction_id.clone().into(),
            self.latest_expires_date.into(),
            self.is_subscribed.into(),
            self.will_auto_renew.into(),
            self.cancellation_date.into(),
            self.latest_receipt.clone().into(),
            self.latest_expired_receipt.clone().into(),
            self.transaction_id.clone().into(),
            self.auto_renew_product_id.clone().into(),
            self.promotional_offer_id.clone().into(),
            self.product_id.clone().into(),
            self.web_order_line_item_id.clone().into(),
            self.is_intro_period.into(),
            self.is_trial_period.into(),
            self.insert_timestamp.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            environment: row.get("environment")?,
            notification_type: row.get("notification_type")?,
            original_transaction_id: row.get("original_transaction_id")?,
            latest_expires_date: row.get("latest_expires_date")?,
            is_subscribed: row.get("is_subscribed")?,
            will_auto_renew: row.get("will_auto_renew")?,
            cancellation_date: row.get("cancellation_date")?,
            latest_receipt: row.get("latest_receipt")?,
            latest_expired_receipt: row.get("latest_expired_receipt")?,
            transaction_id: row.get("transaction_id")?,
            auto_renew_product_id: row.get("auto_renew_product_id")?,
            promotional_offer_id: row.get("promotional_offer_id")?,
            product_id: row.get("product_id")?,
            web_order_line_item_id: row.get("web_order_line_item_id")?,
            is_intro_period: row.get("is_intro_period")?,
            is_trial_period: row.get("is_trial_period")?,
            insert_timestamp: row.get("insert_timestamp")?,
        })
    }
}
