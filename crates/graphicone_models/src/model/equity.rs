//! Market data snapshots and equity exposure on graphs.
//!
//! # Invariants
//! - One `intrinio_dump` row per ticker, refreshed by upsert in place.
//! - Deleting a dump removes its `equity` row and, through it, every
//!   `exposed_equity` row for that ticker.

use super::{EpochMillis, FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Current market/financial metrics for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrinioDump {
    pub ticker: String,
    pub name: Option<String>,
    pub last_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub volume: Option<i64>,
    /// Raw provider payload.
    pub data: JsonValue,
    pub timestamp: Option<EpochMillis>,
}

impl IntrinioDump {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: None,
            last_price: None,
            market_cap: None,
            pe_ratio: None,
            dividend_yield: None,
            fifty_two_week_high: None,
            fifty_two_week_low: None,
            volume: None,
            data: json!({}),
            timestamp: None,
        }
    }
}

impl Record for IntrinioDump {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::INTRINIO_DUMP;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.ticker.clone().into(),
            self.name.clone().into(),
            self.last_price.into(),
            self.market_cap.into(),
            self.pe_ratio.into(),
            self.dividend_yield.into(),
            self.fifty_two_week_high.into(),
            self.fifty_two_week_low.into(),
            self.volume.into(),
            self.data.clone().into(),
            self.timestamp.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ticker: row.get("ticker")?,
            name: row.get("name")?,
            last_price: row.get("last_price")?,
            market_cap: row.get("market_cap")?,
            pe_ratio: row.get("pe_ratio")?,
            dividend_yield: row.get("dividend_yield")?,
            fifty_two_week_high: row.get("fifty_two_week_high")?,
            fifty_two_week_low: row.get("fifty_two_week_low")?,
            volume: row.get("volume")?,
            data: row.get("data")?,
            timestamp: row.get("timestamp")?,
        })
    }
}

/// Display data for a ticker with up to three named trend slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equity {
    pub ticker: String,
    pub name: String,
    pub trend_1: Option<String>,
    pub trend_2: Option<String>,
    pub trend_3: Option<String>,
    pub timestamp: Option<EpochMillis>,
    pub tags: JsonValue,
}

impl Equity {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            trend_1: None,
            trend_2: None,
            trend_3: None,
            timestamp: None,
            tags: json!([]),
        }
    }

    /// Trend slots in slot order, skipping empty ones.
    pub fn trends(&self) -> Vec<&str> {
        [&self.trend_1, &self.trend_2, &self.trend_3]
            .into_iter()
            .filter_map(|slot| slot.as_deref())
            .collect()
    }
}

impl Record for Equity {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::EQUITY;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.ticker.clone().into(),
            self.name.clone().into(),
            self.trend_1.clone().into(),
            self.trend_2.clone().into(),
            self.trend_3.clone().into(),
            self.timestamp.into(),
            self.tags.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ticker: row.get("ticker")?,
            name: row.get("name")?,
            trend_1: row.get("trend_1")?,
            trend_2: row.get("trend_2")?,
            trend_3: row.get("trend_3")?,
            timestamp: row.get("timestamp")?,
            tags: row.get("tags")?,
        })
    }
}

/// "This author exposed this equity on this graph."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedEquity {
    pub equity_id: String,
    pub graph_id: String,
    pub author: String,
}

impl ExposedEquity {
    pub fn new(
        equity_id: impl Into<String>,
        graph_id: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            equity_id: equity_id.into(),
            graph_id: graph_id.into(),
            author: author.into(),
        }
    }
}

impl Record for ExposedEquity {
    /// `(equity_id, graph_id, author)`.
    type Key = (String, String, String);
    const TABLE: &'static TableDef = &catalog::EXPOSED_EQUITY;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.equity_id.clone().into(),
            self.graph_id.clone().into(),
            self.author.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            equity_id: row.get("equity_id")?,
            graph_id: row.get("graph_id")?,
            author: row.get("author")?,
        })
    }
}

/// Per-user choice of equity fields to display for a ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedEquityFields {
    pub equity_ticker: String,
    pub username: String,
    pub fields: JsonValue,
}

impl ExposedEquityFields {
    pub fn new(equity_ticker: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            equity_ticker: equity_ticker.into(),
            username: username.into(),
            fields: json!({}),
        }
    }
}

impl Record for ExposedEquityFields {
    /// `(equity_ticker, username)`.
    type Key = (String, String);
    const TABLE: &'static TableDef = &catalog::EXPOSED_EQUITY_FIELDS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.equity_ticker.clone().into(),
            self.username.clone().into(),
            self.fields.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            equity_ticker: row.get("equity_ticker")?,
            username: row.get("username")?,
            fields: row.get("fields")?,
        })
    }
}
