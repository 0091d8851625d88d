// src/handlers/phases.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    curriculum::{ordering::plan_reorder, validation::require_confirmation},
    error::AppError,
    models::{
        common::{ConfirmDeleteParams, ReorderRequest},
        phase::{NewPhase, PhasePayload},
    },
    state::SharedStore,
};

/// Creates a phase at the end of the curriculum.
/// Instructor only.
pub async fn create_phase(
    State(store): State<SharedStore>,
    Json(payload): Json<PhasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let phase = store.create_phase(NewPhase::from(payload)).await?;
    tracing::info!("Created phase {} at position {}", phase.id, phase.phase_order);

    Ok((StatusCode::CREATED, Json(phase)))
}

/// Replaces a phase's title and description.
/// Instructor only.
pub async fn update_phase(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(payload): Json<PhasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let phase = store
        .update_phase(id, NewPhase::from(payload))
        .await?
        .ok_or(AppError::NotFound("Phase not found".to_string()))?;

    Ok(Json(phase))
}

/// Deletes a phase together with its sections, modules and progress.
/// Instructor only; `?confirm=` must repeat the phase title.
pub async fn delete_phase(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(params): Query<ConfirmDeleteParams>,
) -> Result<impl IntoResponse, AppError> {
    let phase = store
        .get_phase(id)
        .await?
        .ok_or(AppError::NotFound("Phase not found".to_string()))?;

    require_confirmation("phase", &phase.title, &params.confirm)?;

    if !store.delete_phase(id).await? {
        return Err(AppError::NotFound("Phase not found".to_string()));
    }
    tracing::info!("Deleted phase {} ('{}')", id, phase.title);

    Ok(StatusCode::NO_CONTENT)
}

/// Moves one phase and renumbers all phases 1..n.
/// Instructor only. Responds with the phases in their new order.
pub async fn reorder_phases(
    State(store): State<SharedStore>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let siblings = store.list_phases().await?;
    let plan = plan_reorder(siblings, req.moved_id, req.from_index, req.to_index)?;

    if !plan.is_noop() {
        store
            .apply_phase_order(&plan.assignments)
            .await
            .inspect_err(|e| tracing::warn!("Phase reorder failed, client must refetch: {}", e))?;
    }

    Ok(Json(plan.items))
}
