//! Video repository.
//!
//! Likes are a `(video_id, principal_id)` join table; `likes_count` is
//! always computed, never stored, so the returned state is authoritative by
//! construction. Any principal can like, so the set is keyed by the bare
//! subject uuid rather than a customer reference.

use sqlx::PgPool;
use uuid::Uuid;

use tiffinbox_core::VideoId;

use super::RepositoryError;

/// Authoritative like state returned after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub likes_count: i64,
    pub is_liked: bool,
}

/// Repository for video rows and their like sets.
pub struct VideoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VideoRepository<'a> {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Toggle the principal's like on a video.
    ///
    /// Runs delete-else-insert plus the recount inside one transaction, so
    /// the returned state reflects exactly the toggle that happened here.
    /// Returns `Ok(None)` when the video does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn toggle_like(
        &self,
        video_id: VideoId,
        principal_id: Uuid,
    ) -> Result<Option<LikeState>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM video WHERE id = $1)")
            .bind(video_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists.0 {
            return Ok(None);
        }

        let deleted =
            sqlx::query("DELETE FROM video_like WHERE video_id = $1 AND principal_id = $2")
                .bind(video_id)
                .bind(principal_id)
                .execute(&mut *tx)
                .await?;

        let is_liked = if deleted.rows_affected() == 0 {
            sqlx::query("INSERT INTO video_like (video_id, principal_id) VALUES ($1, $2)")
                .bind(video_id)
                .bind(principal_id)
                .execute(&mut *tx)
                .await?;
            true
        } else {
            false
        };

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM video_like WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(LikeState {
            likes_count: count.0,
            is_liked,
        }))
    }
}
