// src/handlers/sections.rs

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
        section::SectionPayload,
    },
    state::SharedStore,
};

/// Creates a section at the end of a phase.
/// Instructor only.
pub async fn create_section(
    State(store): State<SharedStore>,
    Path(phase_id): Path<i64>,
    Json(payload): Json<SectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    store
        .get_phase(phase_id)
        .await?
        .ok_or(AppError::NotFound("Phase not found".to_string()))?;

    let section = store.create_section(payload.into_new(phase_id)).await?;
    tracing::info!(
        "Created section {} in phase {} at position {}",
        section.id,
        phase_id,
        section.section_order
    );

    Ok((StatusCode::CREATED, Json(section)))
}

/// Replaces a section's title and description.
/// Instructor only.
pub async fn update_section(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(payload): Json<SectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let section = store
        .update_section(
            id,
            payload.title.trim().to_string(),
            payload.description.trim().to_string(),
        )
        .await?
        .ok_or(AppError::NotFound("Section not found".to_string()))?;

    Ok(Json(section))
}

/// Deletes a section with all of its modules and their progress.
/// Instructor only; `?confirm=` must repeat the section title.
pub async fn delete_section(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(params): Query<ConfirmDeleteParams>,
) -> Result<impl IntoResponse, AppError> {
    let section = store
        .get_section(id)
        .await?
        .ok_or(AppError::NotFound("Section not found".to_string()))?;

    require_confirmation("section", &section.title, &params.confirm)?;

    if !store.delete_section(id).await? {
        return Err(AppError::NotFound("Section not found".to_string()));
    }
    tracing::info!("Deleted section {} ('{}')", id, section.title);

    Ok(StatusCode::NO_CONTENT)
}

/// Moves one section within its phase and renumbers the phase's sections 1..n.
/// Instructor only. Responds with the sections in their new order.
pub async fn reorder_sections(
    State(store): State<SharedStore>,
    Path(phase_id): Path<i64>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let siblings = store.list_sections_in_phase(phase_id).await?;
    let plan = plan_reorder(siblings, req.moved_id, req.from_index, req.to_index)?;

    if !plan.is_noop() {
        store
            .apply_section_order(phase_id, &plan.assignments)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    "Section reorder in phase {} failed, client must refetch: {}",
                    phase_id,
                    e
                )
            })?;
    }

    Ok(Json(plan.items))
}
