//! Pros/cons discussions, their votes and argument categories, plus the
//! static interests catalog.
//!
//! # Invariants
//! - `count_pros` / `count_cons` are denormalized; nothing in the schema
//!   recomputes them from `pros_and_cons_select`.
//! - One vote per `(pros_and_cons_id, vote_author)` is expected but not
//!   enforced by any constraint.
//! - `pc_arguments.argument` references `pros_and_cons.name`, which is
//!   declared UNIQUE for that reason.

use super::{FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

/// Discussion thread attached to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProsAndCons {
    pub id: String,
    pub name: String,
    pub theme: Option<String>,
    pub ticker: Option<String>,
    pub graph_id: Option<String>,
    pub author: Option<String>,
    pub is_active: bool,
    pub graphs: JsonValue,
    pub count_pros: i64,
    pub count_cons: i64,
}

impl ProsAndCons {
    /// Creates a discussion with a fresh UUID v4 id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            theme: None,
            ticker: None,
            graph_id: None,
            author: None,
            is_active: true,
            graphs: json!([]),
            count_pros: 0,
            count_cons: 0,
        }
    }
}

impl Record for ProsAndCons {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::PROS_AND_CONS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.clone().into(),
            self.name.clone().into(),
            self.theme.clone().into(),
            self.ticker.clone().into(),
            self.graph_id.clone().into(),
            self.author.clone().into(),
            self.is_active.into(),
            self.graphs.clone().into(),
            self.count_pros.into(),
            self.count_cons.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            theme: row.get("theme")?,
            ticker: row.get("ticker")?,
            graph_id: row.get("graph_id")?,
            author: row.get("author")?,
            is_active: row.get("is_active")?,
            graphs: row.get("graphs")?,
            count_pros: row.get("count_pros")?,
            count_cons: row.get("count_cons")?,
        })
    }
}

/// One author's vote on a discussion; `value` is `true` for "pro".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProsAndConsSelect {
    pub id: String,
    pub pros_and_cons_id: String,
    pub vote_author: String,
    pub value: bool,
}

impl ProsAndConsSelect {
    /// Creates a vote with a fresh UUID v4 id.
    pub fn new(
        pros_and_cons_id: impl Into<String>,
        vote_author: impl Into<String>,
        value: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            pros_and_cons_id: pros_and_cons_id.into(),
            vote_author: vote_author.into(),
            value,
        }
    }
}

impl Record for ProsAndConsSelect {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::PROS_AND_CONS_SELECT;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.clone().into(),
            self.pros_and_cons_id.clone().into(),
            self.vote_author.clone().into(),
            self.value.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            pros_and_cons_id: row.get("pros_and_cons_id")?,
            vote_author: row.get("vote_author")?,
            value: row.get("value")?,
        })
    }
}

/// Category assigned to a discussion, keyed by the discussion name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcArgument {
    pub argument: String,
    pub category: Option<String>,
}

impl PcArgument {
    pub fn new(argument: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            category: Some(category.into()),
        }
    }
}

impl Record for PcArgument {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::PC_ARGUMENTS;

    fn values(&self) -> Vec<FieldValue> {
        vec![self.argument.clone().into(), self.category.clone().into()]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            argument: row.get("argument")?,
            category: row.get("category")?,
        })
    }
}

/// Static interest with active/disabled artwork at three sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub id: Option<i64>,
    pub name: String,
    pub category: Option<String>,
    pub link_active_small: String,
    pub link_active_medium: String,
    pub link_active_large: String,
    pub link_disable_small: String,
    pub link_disable_medium: String,
    pub link_disable_large: String,
}

impl Interest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: None,
            link_active_small: String::new(),
            link_active_medium: String::new(),
            link_active_large: String::new(),
            link_disable_small: String::new(),
            link_disable_medium: String::new(),
            link_disable_large: String::new(),
        }
    }
}

impl Record for Interest {
    type Key = i64;
    const TABLE: &'static TableDef = &catalog::INTERESTS;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.into(),
            self.name.clone().into(),
            self.category.clone().into(),
            self.link_active_small.clone().into(),
            self.link_active_medium.clone().into(),
            self.link_active_large.clone().into(),
            self.link_disable_small.clone().into(),
            self.link_disable_medium.clone().into(),
            self.link_disable_large.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            link_active_small: row.get("link_active_small")?,
            link_active_medium: row.get("link_active_medium")?,
            link_active_large: row.get("link_active_large")?,
            link_disable_small: row.get("link_disable_small")?,
            link_disable_medium: row.get("link_disable_medium")?,
            link_disable_large: row.get("link_disable_large")?,
        })
    }
}
