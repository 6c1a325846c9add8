use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::InvalidateResponse;

/// `DELETE /api/v1/cache/invalidate/{entity_id}`
pub async fn invalidate_entity(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> ApiResult<Json<InvalidateResponse>> {
    let invalidated_count = state.serving.invalidate(&entity_id).await?;

    Ok(Json(InvalidateResponse {
        status: "success",
        entity_id,
        invalidated_count,
    }))
}
