//! Boards, graphs and graph tags.
//!
//! # Invariants
//! - Board and graph ids are `B<n>` / `G<n>` minted from independent
//!   sequences when left unset.
//! - `Board::graphs_count` is a denormalized counter kept by callers.
//! - `Graph::parent` is a plain column; it may name a graph that does not
//!   exist.
//! - `Graph::publisher` does not cascade: an account with published graphs
//!   cannot be deleted until the caller clears or removes them.

use super::{EpochMillis, FieldValue, Record};
use crate::schema::{catalog, TableDef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Collection of graphs owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// `None` until minted on insert.
    pub id: Option<String>,
    pub name: String,
    pub owner: Option<String>,
    /// JSON array of member usernames.
    pub members: JsonValue,
    pub preview_img_url: String,
    pub graphs_count: Option<i64>,
    pub privacy: Option<String>,
    pub timestamp: Option<EpochMillis>,
}

impl Board {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            owner: Some(owner.into()),
            members: json!([]),
            preview_img_url: String::new(),
            graphs_count: Some(0),
            privacy: None,
            timestamp: None,
        }
    }
}

impl Record for Board {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::BOARD;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.clone().into(),
            self.name.clone().into(),
            self.owner.clone().into(),
            self.members.clone().into(),
            self.preview_img_url.clone().into(),
            self.graphs_count.into(),
            self.privacy.clone().into(),
            self.timestamp.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            owner: row.get("owner")?,
            members: row.get("members")?,
            preview_img_url: row.get("preview_img_url")?,
            graphs_count: row.get("graphs_count")?,
            privacy: row.get("privacy")?,
            timestamp: row.get("timestamp")?,
        })
    }
}

/// Published chart with size variants and classification metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    /// `None` until minted on insert.
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    pub location_id: Option<String>,
    pub link_small: JsonValue,
    pub link_medium: JsonValue,
    pub link_large: JsonValue,
    /// Snapshot of the owner profile at publish time, not a foreign key.
    pub owner: JsonValue,
    pub source: String,
    pub description: String,
    pub parent: Option<String>,
    pub publish_date: Option<EpochMillis>,
    pub timestamp: Option<EpochMillis>,
    pub article_link: String,
    pub publisher: Option<String>,
    pub mongo_id: Option<String>,
    pub graph_type: Option<String>,
    pub shifts: JsonValue,
    pub industries: JsonValue,
    pub upvote: i64,
}

impl Graph {
    pub fn new(location: impl Into<String>, owner: JsonValue) -> Self {
        Self {
            id: None,
            name: String::new(),
            location: location.into(),
            location_id: None,
            link_small: json!({}),
            link_medium: json!({}),
            link_large: json!({}),
            owner,
            source: String::new(),
            description: String::new(),
            parent: None,
            publish_date: None,
            timestamp: None,
            article_link: String::new(),
            publisher: None,
            mongo_id: None,
            graph_type: None,
            shifts: json!([]),
            industries: json!([]),
            upvote: 0,
        }
    }
}

impl Record for Graph {
    type Key = String;
    const TABLE: &'static TableDef = &catalog::GRAPH;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.id.clone().into(),
            self.name.clone().into(),
            self.location.clone().into(),
            self.location_id.clone().into(),
            self.link_small.clone().into(),
            self.link_medium.clone().into(),
            self.link_large.clone().into(),
            self.owner.clone().into(),
            self.source.clone().into(),
            self.description.clone().into(),
            self.parent.clone().into(),
            self.publish_date.into(),
            self.timestamp.into(),
            self.article_link.clone().into(),
            self.publisher.clone().into(),
            self.mongo_id.clone().into(),
            self.graph_type.clone().into(),
            self.shifts.clone().into(),
            self.industries.clone().into(),
            self.upvote.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            location: row.get("location")?,
            location_id: row.get("location_id")?,
            link_small: row.get("link_small")?,
            link_medium: row.get("link_medium")?,
            link_large: row.get("link_large")?,
            owner: row.get("owner")?,
            source: row.get("source")?,
            description: row.get("description")?,
            parent: row.get("parent")?,
            publish_date: row.get("publish_date")?,
            timestamp: row.get("timestamp")?,
            article_link: row.get("article_link")?,
            publisher: row.get("publisher")?,
            mongo_id: row.get("mongo_id")?,
            graph_type: row.get("graph_type")?,
            shifts: row.get("shifts")?,
            industries: row.get("industries")?,
            upvote: row.get("upvote")?,
        })
    }
}

/// Free-text label an author attached to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub value: String,
    pub graph_id: String,
    pub author: String,
}

impl Tag {
    pub fn new(
        value: impl Into<String>,
        graph_id: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            graph_id: graph_id.into(),
            author: author.into(),
        }
    }
}

impl Record for Tag {
    /// `(value, graph_id, author)`.
    type Key = (String, String, String);
    const TABLE: &'static TableDef = &catalog::TAG;

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.value.clone().into(),
            self.graph_id.clone().into(),
            self.author.clone().into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            value: row.get("value")?,
            graph_id: row.get("graph_id")?,
            author: row.get("author")?,
        })
    }
}
