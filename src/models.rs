//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A video catalog record from the database. Serialized with camelCase
/// field names to match what the frontend expects.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Display string (e.g. "12:34"), not validated as a time value
    pub duration: String,
    pub category: String,
    pub video_url: String,
    /// Display string, defaults to "0"
    pub views: String,
    pub created_at: DateTime<Utc>,
}
