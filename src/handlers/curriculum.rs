// src/handlers/curriculum.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{
    curriculum::tree::{PhaseNode, ProgressSummary, build_tree, summarize},
    error::AppError,
    models::user::{CurrentUser, Role},
    state::SharedStore,
};

#[derive(Debug, Serialize)]
pub struct CurriculumResponse {
    pub phases: Vec<PhaseNode>,
    pub summary: ProgressSummary,
}

/// Loads every phase, section and module plus `user_id`'s progress and
/// assembles the tree as `role` is allowed to see it.
pub async fn load_tree(
    store: &SharedStore,
    user_id: i64,
    role: Role,
) -> Result<Vec<PhaseNode>, AppError> {
    let (phases, sections, modules, progress) = tokio::try_join!(
        store.list_phases(),
        store.list_sections(),
        store.list_modules(),
        store.list_progress_for_user(user_id),
    )?;

    Ok(build_tree(phases, sections, modules, progress, role))
}

/// Returns the full curriculum tree annotated with the caller's progress.
/// Students only see published modules.
pub async fn get_curriculum(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let phases = load_tree(&store, user.id, user.role).await?;
    let summary = summarize(&phases);

    Ok(Json(CurriculumResponse { phases, summary }))
}
