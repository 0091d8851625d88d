// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
    curriculum::{
        progress::{CompletionState, next_record},
        tree::visible_to,
    },
    error::AppError,
    models::{progress::ProgressRecord, user::CurrentUser},
    state::SharedStore,
};

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub module_id: i64,
    pub state: CompletionState,
    pub progress: ProgressRecord,
}

/// Flips the caller's completion state for a module.
///
/// NotStarted -> Completed stamps `completed_at`; Completed -> NotStarted
/// clears it. The record is upserted on `(user_id, module_id)`.
pub async fn toggle_completion(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
    Path(module_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let module = store
        .get_module(module_id)
        .await?
        .filter(|m| visible_to(m, user.role))
        .ok_or(AppError::NotFound("Module not found".to_string()))?;

    let current = store.get_progress(user.id, module.id).await?;
    let next = next_record(current.as_ref(), user.id, module.id, Utc::now());
    let saved = store.upsert_progress(next).await?;

    tracing::debug!(
        "User {} marked module {} as {}",
        user.id,
        module.id,
        if saved.is_completed { "complete" } else { "incomplete" }
    );

    Ok(Json(ToggleResponse {
        module_id: module.id,
        state: CompletionState::of(Some(&saved)),
        progress: saved,
    }))
}
