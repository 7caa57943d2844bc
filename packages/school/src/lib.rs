pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hogwarts School API",
        version = "1.0.0",
        description = "Students, faculties and student avatars"
    ),
    paths(
        handlers::student::create_student,
        handlers::student::get_student,
        handlers::student::list_students,
        handlers::student::update_student,
        handlers::student::delete_student,
        handlers::student::students_by_age,
        handlers::student::students_by_age_range,
        handlers::student::count_students,
        handlers::student::average_age,
        handlers::student::last_students,
        handlers::student::faculty_of_student,
        handlers::student::student_names,
        handlers::faculty::create_faculty,
        handlers::faculty::get_faculty,
        handlers::faculty::list_faculties,
        handlers::faculty::faculty_students,
        handlers::faculty::longest_faculty_name,
        handlers::faculty::update_faculty,
        handlers::faculty::delete_faculty,
        handlers::avatar::upload_avatar,
        handlers::avatar::preview_avatar,
        handlers::avatar::download_avatar,
        handlers::avatar::list_avatars,
        handlers::info::port,
    ),
    tags(
        (name = "Students", description = "Student CRUD and queries"),
        (name = "Faculties", description = "Faculty CRUD and queries"),
        (name = "Avatars", description = "Student avatar upload and retrieval"),
        (name = "Info", description = "Instance information"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors);

    routes::api_routes(&state.config)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}
