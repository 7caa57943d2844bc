use std::path::Path as FsPath;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sea_orm::TransactionTrait;
use tracing::{instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::faculty::SimpleFacultyResponse;
use crate::models::student::*;
use crate::services::{DeletedStudent, StudentService};
use crate::services::student::StudentWithFaculty;
use crate::state::AppState;

const DEFAULT_NAME_PREFIX: &str = "A";

fn to_responses(rows: Vec<StudentWithFaculty>) -> Vec<StudentResponse> {
    rows.into_iter()
        .map(|(s, f)| StudentResponse::new(s, f))
        .collect()
}

#[utoipa::path(
    post,
    path = "/student",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Create a student",
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student created", body = StudentResponse),
        (status = 400, description = "Blank name or non-positive age (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_student(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (student, faculty) = StudentService::new(&txn)
        .create(&payload.name, payload.age, payload.faculty_id)
        .await?;
    txn.commit().await?;

    Ok(Json(StudentResponse::new(student, faculty)))
}

#[utoipa::path(
    get,
    path = "/student/{id}",
    tag = "Students",
    operation_id = "getStudent",
    summary = "Get a student by ID",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 400, description = "Non-positive id (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let (student, faculty) = StudentService::new(&state.db).get(id).await?;
    Ok(Json(StudentResponse::new(student, faculty)))
}

#[utoipa::path(
    get,
    path = "/student",
    tag = "Students",
    operation_id = "listStudents",
    summary = "List all students",
    responses((status = 200, description = "All students ordered by id", body = Vec<StudentResponse>)),
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let rows = StudentService::new(&state.db).list_all().await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    put,
    path = "/student",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Replace a student",
    description = "Overwrites name, age and faculty of the student identified by `id`.",
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation error (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Student or faculty not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = payload.id))]
pub async fn update_student(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    let txn = state.db.begin().await?;
    let (student, faculty) = StudentService::new(&txn)
        .update(payload.id, &payload.name, payload.age, payload.faculty_id)
        .await?;
    txn.commit().await?;

    Ok(Json(StudentResponse::new(student, faculty)))
}

#[utoipa::path(
    delete,
    path = "/student/{id}",
    tag = "Students",
    operation_id = "deleteStudent",
    summary = "Delete a student",
    description = "Deletes the student and its avatar (row and file). Returns the deleted student.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Deleted student", body = StudentResponse),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let guard = state.upload_locks.acquire(id).await;
    let deleted = match delete_in_txn(&state, id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            drop(guard);
            state.upload_locks.forget(id);
            return Err(e);
        }
    };

    if let Some(avatar) = &deleted.avatar {
        let location = FsPath::new(&avatar.file_path);
        if let Err(e) = state.avatar_store.delete(location).await {
            warn!(student_id = id, path = %avatar.file_path, error = %e, "Failed to remove avatar file");
        }
    }
    drop(guard);
    state.upload_locks.forget(id);

    Ok(Json(StudentResponse::new(deleted.student, deleted.faculty)))
}

async fn delete_in_txn(state: &AppState, id: i32) -> Result<DeletedStudent, AppError> {
    let txn = state.db.begin().await?;
    let deleted = StudentService::new(&txn).delete(id).await?;
    txn.commit().await?;
    Ok(deleted)
}

#[utoipa::path(
    get,
    path = "/student/age/{age}",
    tag = "Students",
    operation_id = "studentsByAge",
    summary = "Students of an exact age",
    params(("age" = i32, Path, description = "Age in years")),
    responses(
        (status = 200, description = "Matching students", body = Vec<StudentResponse>),
        (status = 400, description = "Non-positive age (INVALID_ARGUMENT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn students_by_age(
    State(state): State<AppState>,
    Path(age): Path<i32>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let rows = StudentService::new(&state.db).find_by_age(age).await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    get,
    path = "/student/agebetween/{range}",
    tag = "Students",
    operation_id = "studentsByAgeRange",
    summary = "Students within an inclusive age range",
    params(("range" = String, Path, description = "`{min}-{max}`, e.g. `11-17`")),
    responses(
        (status = 200, description = "Matching students", body = Vec<StudentResponse>),
        (status = 400, description = "Malformed or inverted range (INVALID_ARGUMENT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn students_by_age_range(
    State(state): State<AppState>,
    Path(range): Path<String>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let (min, max) = parse_age_range(&range)?;
    let rows = StudentService::new(&state.db)
        .find_by_age_between(min, max)
        .await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    get,
    path = "/student/count",
    tag = "Students",
    operation_id = "countStudents",
    summary = "Number of students",
    responses((status = 200, description = "Student count", body = u64)),
)]
#[instrument(skip(state))]
pub async fn count_students(State(state): State<AppState>) -> Result<Json<u64>, AppError> {
    Ok(Json(StudentService::new(&state.db).count().await?))
}

#[utoipa::path(
    get,
    path = "/student/age/avg",
    tag = "Students",
    operation_id = "averageStudentAge",
    summary = "Average student age",
    responses((status = 200, description = "Mean age, 0.0 without students", body = f64)),
)]
#[instrument(skip(state))]
pub async fn average_age(State(state): State<AppState>) -> Result<Json<f64>, AppError> {
    Ok(Json(StudentService::new(&state.db).average_age().await?))
}

#[utoipa::path(
    get,
    path = "/student/last",
    tag = "Students",
    operation_id = "lastStudents",
    summary = "Five most recently added students",
    responses((status = 200, description = "Newest first", body = Vec<StudentResponse>)),
)]
#[instrument(skip(state))]
pub async fn last_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let rows = StudentService::new(&state.db).last_five().await?;
    Ok(Json(to_responses(rows)))
}

#[utoipa::path(
    get,
    path = "/student/faculty/{id}",
    tag = "Students",
    operation_id = "facultyOfStudent",
    summary = "Faculty a student belongs to",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "The student's faculty", body = SimpleFacultyResponse),
        (status = 204, description = "Student has no faculty"),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn faculty_of_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let faculty = StudentService::new(&state.db).faculty_of(id).await?;
    Ok(match faculty {
        Some(f) => Json(SimpleFacultyResponse::from(f)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

#[utoipa::path(
    get,
    path = "/student/names",
    tag = "Students",
    operation_id = "studentNamesByPrefix",
    summary = "Upper-cased student names with a given prefix",
    params(StudentNamesQuery),
    responses((status = 200, description = "Sorted names", body = Vec<String>)),
)]
#[instrument(skip(state, query))]
pub async fn student_names(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StudentNamesQuery>,
) -> Result<Json<Vec<String>>, AppError> {
    let prefix = query.prefix.as_deref().unwrap_or(DEFAULT_NAME_PREFIX);
    let names = StudentService::new(&state.db)
        .names_starting_with(prefix)
        .await?;
    Ok(Json(names))
}
