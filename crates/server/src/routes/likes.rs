//! Video like routes.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use tiffinbox_core::VideoId;

use crate::db::videos::VideoRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// POST /likes/toggle/{video_id}
///
/// Toggles the caller's like and returns the authoritative state; clients
/// that showed an optimistic count reconcile to this. Any authenticated
/// principal can like - owners included.
#[tracing::instrument(skip_all)]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(video_id): Path<VideoId>,
) -> Result<impl IntoResponse> {
    let like_state = VideoRepository::new(state.pool())
        .toggle_like(video_id, principal.id())
        .await?
        .ok_or_else(|| AppError::NotFound("video not found".to_owned()))?;

    tracing::debug!(
        subject = %principal.id(),
        video_id = %video_id,
        is_liked = like_state.is_liked,
        "like toggled"
    );

    Ok(Json(json!({
        "likes_count": like_state.likes_count,
        "is_liked": like_state.is_liked,
    })))
}
