// src/handlers/modules.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    curriculum::{
        ordering::plan_reorder,
        tree::module_detail,
        validation::{require_confirmation, validate_module_content},
    },
    error::AppError,
    handlers::curriculum::load_tree,
    models::{
        common::{ConfirmDeleteParams, ReorderRequest},
        module::{CreateModuleRequest, ModuleMetadata, UpdateContentRequest, UpdateModuleRequest},
        user::CurrentUser,
    },
    state::SharedStore,
};

/// Creates a module at the end of a section.
/// Instructor only. `external_link` modules must carry a URL.
pub async fn create_module(
    State(store): State<SharedStore>,
    Path(section_id): Path<i64>,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_module = payload.into_new(section_id);
    validate_module_content(new_module.content_type, new_module.external_url.as_deref())?;

    store
        .get_section(section_id)
        .await?
        .ok_or(AppError::NotFound("Section not found".to_string()))?;

    let module = store.create_module(new_module).await?;
    tracing::info!(
        "Created module {} in section {} at position {}",
        module.id,
        section_id,
        module.module_order
    );

    Ok((StatusCode::CREATED, Json(module)))
}

/// Module page payload: the module with the caller's progress, its section and
/// phase, the phase outline and previous/next navigation within the phase.
pub async fn get_module(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tree = load_tree(&store, user.id, user.role).await?;

    let detail = module_detail(&tree, id).ok_or(AppError::NotFound("Module not found".to_string()))?;

    Ok(Json(detail))
}

/// Replaces a module's metadata.
/// Instructor only.
pub async fn update_module(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let metadata = ModuleMetadata::from(payload);
    validate_module_content(metadata.content_type, metadata.external_url.as_deref())?;

    let module = store
        .update_module_metadata(id, metadata)
        .await?
        .ok_or(AppError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

/// Replaces a module's body.
/// Instructor only.
pub async fn update_module_content(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let module = store
        .update_module_content(id, payload.content)
        .await?
        .ok_or(AppError::NotFound("Module not found".to_string()))?;

    Ok(Json(module))
}

/// Deletes a module and every progress record for it.
/// Instructor only; `?confirm=` must repeat the module title.
pub async fn delete_module(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Query(params): Query<ConfirmDeleteParams>,
) -> Result<impl IntoResponse, AppError> {
    let module = store
        .get_module(id)
        .await?
        .ok_or(AppError::NotFound("Module not found".to_string()))?;

    require_confirmation("module", &module.title, &params.confirm)?;

    if !store.delete_module(id).await? {
        return Err(AppError::NotFound("Module not found".to_string()));
    }
    tracing::info!("Deleted module {} ('{}')", id, module.title);

    Ok(StatusCode::NO_CONTENT)
}

/// Moves one module within its section and renumbers the section's modules 1..n.
/// Instructor only. Responds with the modules in their new order.
pub async fn reorder_modules(
    State(store): State<SharedStore>,
    Path(section_id): Path<i64>,
    Json(req): Json<ReorderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let siblings = store.list_modules_in_section(section_id).await?;
    let plan = plan_reorder(siblings, req.moved_id, req.from_index, req.to_index)?;

    if !plan.is_noop() {
        store
            .apply_module_order(section_id, &plan.assignments)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    "Module reorder in section {} failed, client must refetch: {}",
                    section_id,
                    e
                )
            })?;
    }

    Ok(Json(plan.items))
}
