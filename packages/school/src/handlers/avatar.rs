use axum::Json;
use axum::body::Body;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::avatar::{AvatarListResponse, AvatarPageQuery, AvatarResponse};
use crate::services::avatar::too_big;
use crate::services::{AvatarService, AvatarUpload};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file cap.
const MULTIPART_SLACK: usize = 64 * 1024;

pub fn avatar_upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_upload_size as usize + MULTIPART_SLACK)
}

fn avatar_service(state: &AppState) -> AvatarService<'_, sea_orm::DatabaseConnection> {
    AvatarService::new(
        &state.db,
        &*state.avatar_store,
        state.config.avatar.max_upload_size,
    )
}

#[utoipa::path(
    post,
    path = "/student/{id}/avatar",
    tag = "Avatars",
    operation_id = "uploadAvatar",
    summary = "Upload a student's avatar",
    description = "Stores the `avatar` multipart field as the student's avatar, replacing any \
        previous one. The file is written to `{avatar.directory}/{id}.{ext}` and a copy of the \
        bytes is kept in the database for previews.",
    params(("id" = i32, Path, description = "Student ID")),
    request_body(content_type = "multipart/form-data", description = "Image in the `avatar` field"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Empty, oversized or badly named file (INVALID_ARGUMENT)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage failure (PROCESSING_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(student_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let max = state.config.avatar.max_upload_size;
    let mut upload: Option<AvatarUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("avatar") {
            upload = Some(read_avatar_field(field, max).await?);
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::InvalidArgument("Missing 'avatar' field".into()))?;

    let model = avatar_service(&state)
        .upload(&state.upload_locks, student_id, upload)
        .await?;

    Ok(Json(AvatarResponse::from(model)))
}

/// Buffer one multipart field, failing as soon as it grows past `max` bytes.
async fn read_avatar_field(mut field: Field<'_>, max: u64) -> Result<AvatarUpload, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(|s| s.to_string());

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::InvalidArgument(format!("Failed to read avatar: {e}")))?
    {
        if (data.len() + chunk.len()) as u64 > max {
            return Err(too_big(max));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(AvatarUpload {
        file_name,
        content_type,
        data,
    })
}

#[utoipa::path(
    get,
    path = "/student/{id}/avatar/preview",
    tag = "Avatars",
    operation_id = "previewAvatar",
    summary = "Get the stored avatar preview",
    description = "Returns the bytes kept in the database row, not the file on disk.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Preview bytes with the stored media type"),
        (status = 404, description = "No avatar for this student (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn preview_avatar(
    State(state): State<AppState>,
    Path(student_id): Path<i32>,
) -> Result<Response, AppError> {
    let (data, media_type) = avatar_service(&state).preview(student_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, media_type),
            (header::CONTENT_LENGTH, data.len().to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        data,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/student/{id}/avatar",
    tag = "Avatars",
    operation_id = "downloadAvatar",
    summary = "Download the full avatar file",
    description = "Streams the file from disk with the media type and size recorded at upload.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Avatar file"),
        (status = 404, description = "No avatar row, or its file is missing (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn download_avatar(
    State(state): State<AppState>,
    Path(student_id): Path<i32>,
) -> Result<Response, AppError> {
    let file = avatar_service(&state).open_file(student_id).await?;
    let body = Body::from_stream(ReaderStream::new(file.reader));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.media_type)
        .header(header::CONTENT_LENGTH, file.file_size.to_string())
        .body(body)
        .map_err(|e| AppError::Processing(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    get,
    path = "/student/avatar/all",
    tag = "Avatars",
    operation_id = "listAvatars",
    summary = "List avatars page by page",
    params(AvatarPageQuery),
    responses(
        (status = 200, description = "Page of avatar metadata", body = AvatarListResponse),
        (status = 400, description = "Missing or non-positive page/size (INVALID_ARGUMENT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_avatars(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AvatarPageQuery>,
) -> Result<Json<AvatarListResponse>, AppError> {
    let (Some(page), Some(size)) = (query.page, query.size) else {
        return Err(AppError::InvalidArgument(
            "Page number and size are required".into(),
        ));
    };

    let (data, pagination) = avatar_service(&state).list_avatars(page, size).await?;
    Ok(Json(AvatarListResponse { data, pagination }))
}
