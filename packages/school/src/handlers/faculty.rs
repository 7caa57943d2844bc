use axum::Json;
use axum::extract::{Path, State};
use sea_orm::TransactionTrait;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::faculty::*;
use crate::models::student::SimpleStudentResponse;
use crate::services::FacultyService;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/faculty",
    tag = "Faculties",
    operation_id = "createFaculty",
    summary = "Create a faculty",
    request_body = CreateFacultyRequest,
    responses(
        (status = 200, description = "Faculty created", body = FacultyResponse),
        (status = 400, description = "Blank name or color (INVALID_ARGUMENT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_faculty(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFacultyRequest>,
) -> Result<Json<FacultyResponse>, AppError> {
    let model = FacultyService::new(&state.db)
        .create(&payload.name, &payload.color)
        .await?;
    Ok(Json(FacultyResponse::new(model, Vec::new())))
}

#[utoipa::path(
    get,
    path = "/faculty/{id}",
    tag = "Faculties",
    operation_id = "getFaculty",
    summary = "Get a faculty with its students",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty", body = FacultyResponse),
        (status = 400, description = "Non-positive id (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FacultyResponse>, AppError> {
    let (faculty, students) = FacultyService::new(&state.db)
        .get_with_students(id)
        .await?;
    Ok(Json(FacultyResponse::new(faculty, students)))
}

#[utoipa::path(
    get,
    path = "/faculty",
    tag = "Faculties",
    operation_id = "listFaculties",
    summary = "List or filter faculties",
    description = "Filters by exact `name` or, when no name is given, exact `color`. \
        Matching ignores case. Without filters every faculty is returned.",
    params(FacultyListQuery),
    responses((status = 200, description = "Faculties", body = Vec<SimpleFacultyResponse>)),
)]
#[instrument(skip(state, query))]
pub async fn list_faculties(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FacultyListQuery>,
) -> Result<Json<Vec<SimpleFacultyResponse>>, AppError> {
    let rows = FacultyService::new(&state.db)
        .list(query.name.as_deref(), query.color.as_deref())
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/faculty/students/{id}",
    tag = "Faculties",
    operation_id = "facultyStudents",
    summary = "Students of a faculty",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Students ordered by id", body = Vec<SimpleStudentResponse>),
        (status = 404, description = "Faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn faculty_students(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SimpleStudentResponse>>, AppError> {
    let students = FacultyService::new(&state.db).students_of(id).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/faculty/longest-name",
    tag = "Faculties",
    operation_id = "longestFacultyName",
    summary = "The longest faculty name",
    responses(
        (status = 200, description = "Faculty name as plain text", body = String, content_type = "text/plain"),
        (status = 404, description = "No faculties (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn longest_faculty_name(State(state): State<AppState>) -> Result<String, AppError> {
    FacultyService::new(&state.db).longest_name().await
}

#[utoipa::path(
    put,
    path = "/faculty",
    tag = "Faculties",
    operation_id = "updateFaculty",
    summary = "Replace a faculty",
    request_body = UpdateFacultyRequest,
    responses(
        (status = 200, description = "Faculty updated", body = FacultyResponse),
        (status = 400, description = "Validation error (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = payload.id))]
pub async fn update_faculty(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateFacultyRequest>,
) -> Result<Json<FacultyResponse>, AppError> {
    let txn = state.db.begin().await?;
    let service = FacultyService::new(&txn);
    service
        .update(payload.id, &payload.name, &payload.color)
        .await?;
    let (faculty, students) = service.get_with_students(payload.id).await?;
    txn.commit().await?;

    Ok(Json(FacultyResponse::new(faculty, students)))
}

#[utoipa::path(
    delete,
    path = "/faculty/{id}",
    tag = "Faculties",
    operation_id = "deleteFaculty",
    summary = "Delete a faculty",
    description = "Students of the faculty are kept and left without a faculty.",
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Deleted faculty", body = SimpleFacultyResponse),
        (status = 404, description = "Faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SimpleFacultyResponse>, AppError> {
    let txn = state.db.begin().await?;
    let deleted = FacultyService::new(&txn).delete(id).await?;
    txn.commit().await?;

    Ok(Json(deleted.into()))
}
