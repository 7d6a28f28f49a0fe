use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::dispatch::AuditSink;
use crate::models::Container;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Completed,
    Failed
}

impl DownloadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed"
        }
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audit entry as produced by a dispatch, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDownloadRecord {
    pub user_id: Option<String>,
    pub video_title: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub container: Container,
    pub quality_label: String,
    pub approximate_size_bytes: Option<u64>,
    pub size: String,
    pub status: DownloadStatus
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub video_title: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub container: String,
    pub quality_label: String,
    pub approximate_size_bytes: Option<i64>,
    pub size: String,
    pub status: String,
    pub created_at: String
}

impl DownloadRecord {
    /// Appends a record and returns its id. Rows are never updated afterwards.
    pub async fn insert(pool: &SqlitePool, record: &NewDownloadRecord) -> Result<String, sqlx::Error> {
        let id = uuid7::uuid7().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let size_bytes = record.approximate_size_bytes.and_then(|b| i64::try_from(b).ok());

        sqlx::query(
            r"INSERT INTO download_history (id, user_id, video_title, video_url, thumbnail_url,
                                             container, quality_label, approximate_size_bytes,
                                             size, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(record.user_id.as_deref())
        .bind(&record.video_title)
        .bind(&record.video_url)
        .bind(&record.thumbnail_url)
        .bind(record.container.as_str())
        .bind(&record.quality_label)
        .bind(size_bytes)
        .bind(&record.size)
        .bind(record.status.as_str())
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(id)
    }

    pub async fn find_recent(
        pool: &SqlitePool,
        user_id: Option<&str>,
        limit: i64
    ) -> Result<Vec<Self>, sqlx::Error> {
        match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Self>(
                    r"SELECT id, user_id, video_title, video_url, thumbnail_url, container,
                              quality_label, approximate_size_bytes, size, status, created_at
                       FROM download_history WHERE user_id = ?
                       ORDER BY created_at DESC, id DESC LIMIT ?"
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(
                    r"SELECT id, user_id, video_title, video_url, thumbnail_url, container,
                              quality_label, approximate_size_bytes, size, status, created_at
                       FROM download_history
                       ORDER BY created_at DESC, id DESC LIMIT ?"
                )
                .bind(limit)
                .fetch_all(pool)
                .await
            }
        }
    }
}

#[async_trait]
impl AuditSink for SqlitePool {
    async fn record(
        &self,
        record: &NewDownloadRecord
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let id = DownloadRecord::insert(self, record).await?;
        tracing::debug!("Recorded download {} for {}", id, record.video_title);
        Ok(())
    }
}
