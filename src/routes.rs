// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{curriculum, dashboard, health, modules, phases, progress, sections},
    state::AppState,
    utils::jwt::{auth_middleware, instructor_middleware},
};

/// Assembles the main application router.
///
/// * Member routes (any authenticated user): curriculum tree, module pages,
///   completion toggles, the student dashboard.
/// * Instructor routes: authoring, reordering, deletion, the class dashboard.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let member_routes = Router::new()
        .route("/curriculum", get(curriculum::get_curriculum))
        .route("/modules/{id}", get(modules::get_module))
        .route("/modules/{id}/progress", post(progress::toggle_completion))
        .route("/dashboard/student", get(dashboard::get_student_dashboard));

    let instructor_routes = Router::new()
        .route("/phases", post(phases::create_phase))
        .route("/phases/reorder", post(phases::reorder_phases))
        .route(
            "/phases/{id}",
            put(phases::update_phase).delete(phases::delete_phase),
        )
        .route("/phases/{id}/sections", post(sections::create_section))
        .route(
            "/phases/{id}/sections/reorder",
            post(sections::reorder_sections),
        )
        .route(
            "/sections/{id}",
            put(sections::update_section).delete(sections::delete_section),
        )
        .route("/sections/{id}/modules", post(modules::create_module))
        .route(
            "/sections/{id}/modules/reorder",
            post(modules::reorder_modules),
        )
        .route(
            "/modules/{id}",
            put(modules::update_module).delete(modules::delete_module),
        )
        .route("/modules/{id}/content", put(modules::update_module_content))
        .route(
            "/dashboard/instructor",
            get(dashboard::get_instructor_dashboard),
        )
        // Role check runs after authentication (layers apply outside in)
        .layer(middleware::from_fn(instructor_middleware));

    let api_routes = member_routes
        .merge(instructor_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // Added after the auth layer, so it stays public
        .route("/health", get(health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
