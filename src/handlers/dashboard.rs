// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    config::{INSTRUCTOR_UPCOMING_LIMIT, STUDENT_UPCOMING_LIMIT},
    curriculum::{
        dashboard::{instructor_dashboard, student_dashboard},
        tree::build_tree,
    },
    error::AppError,
    handlers::curriculum::load_tree,
    models::user::{CurrentUser, Role},
    state::SharedStore,
};

/// The caller's own progress over the published curriculum and their
/// nearest unfinished deadlines.
pub async fn get_student_dashboard(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let tree = load_tree(&store, user.id, Role::Student).await?;

    Ok(Json(student_dashboard(&tree, STUDENT_UPCOMING_LIMIT)))
}

/// Class-wide completion rates, upcoming deadlines and the students who
/// missed the latest one.
/// Instructor only.
pub async fn get_instructor_dashboard(
    State(store): State<SharedStore>,
) -> Result<impl IntoResponse, AppError> {
    let (phases, sections, modules, progress, students) = tokio::try_join!(
        store.list_phases(),
        store.list_sections(),
        store.list_modules(),
        store.list_completed_progress(),
        store.list_profiles_by_role(Role::Student),
    )?;

    let tree = build_tree(phases, sections, modules, Vec::new(), Role::Student);

    Ok(Json(instructor_dashboard(
        &tree,
        &progress,
        &students,
        Utc::now(),
        INSTRUCTOR_UPCOMING_LIMIT,
    )))
}
