//! Video catalog domain - DB queries for video records
//!
//! All functions use the generic Executor pattern, allowing them to work
//! with both `&PgPool` (for standalone queries) and `&mut PgConnection`
//! (for transactions).

use sqlx::{Executor, Postgres};

use crate::models::Video;

/// Field values for a record about to be inserted. `created_at` is
/// defaulted server-side at insert time.
#[derive(Debug)]
pub struct NewVideo<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub thumbnail: Option<&'a str>,
    pub duration: &'a str,
    pub category: &'a str,
    pub video_url: &'a str,
    pub views: &'a str,
}

/// All video records, newest first. An empty table yields an empty vec.
pub async fn list_videos<'e, E>(executor: E) -> Result<Vec<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, title, description, thumbnail, duration, category, video_url, views, created_at
        FROM videos
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Insert a record and return it as stored, including the generated id
/// and the defaulted creation time.
pub async fn insert_video<'e, E>(executor: E, video: &NewVideo<'_>) -> Result<Video, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO videos (title, description, thumbnail, duration, category, video_url, views)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, title, description, thumbnail, duration, category, video_url, views, created_at
        "#,
    )
    .bind(video.title)
    .bind(video.description)
    .bind(video.thumbnail)
    .bind(video.duration)
    .bind(video.category)
    .bind(video.video_url)
    .bind(video.views)
    .fetch_one(executor)
    .await
}
