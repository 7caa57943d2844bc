use axum::{
    Router,
    routing::{get, post},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .nest("/student", student_routes(config))
        .nest("/faculty", faculty_routes())
        .route("/port", get(handlers::info::port))
}

fn student_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::student::list_students)
                .post(handlers::student::create_student)
                .put(handlers::student::update_student),
        )
        .route(
            "/{id}",
            get(handlers::student::get_student).delete(handlers::student::delete_student),
        )
        .route("/age/avg", get(handlers::student::average_age))
        .route("/age/{age}", get(handlers::student::students_by_age))
        .route(
            "/agebetween/{range}",
            get(handlers::student::students_by_age_range),
        )
        .route("/count", get(handlers::student::count_students))
        .route("/last", get(handlers::student::last_students))
        .route("/names", get(handlers::student::student_names))
        .route("/faculty/{id}", get(handlers::student::faculty_of_student))
        .merge(avatar_routes(config))
}

fn avatar_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/avatar",
            post(handlers::avatar::upload_avatar)
                .layer(handlers::avatar::avatar_upload_body_limit(
                    config.avatar.max_upload_size,
                ))
                .get(handlers::avatar::download_avatar),
        )
        .route(
            "/{id}/avatar/preview",
            get(handlers::avatar::preview_avatar),
        )
        .route("/avatar/all", get(handlers::avatar::list_avatars))
}

fn faculty_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::faculty::list_faculties)
                .post(handlers::faculty::create_faculty)
                .put(handlers::faculty::update_faculty),
        )
        .route(
            "/{id}",
            get(handlers::faculty::get_faculty).delete(handlers::faculty::delete_faculty),
        )
        .route(
            "/students/{id}",
            get(handlers::faculty::faculty_students),
        )
        .route(
            "/longest-name",
            get(handlers::faculty::longest_faculty_name),
        )
}
