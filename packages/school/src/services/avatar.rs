use std::path::Path;
use std::sync::Arc;

use common::filename;
use common::storage::{BoxReader, FileStore};
use dashmap::DashMap;
use sea_orm::*;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::entity::{avatar, student};
use crate::error::AppError;
use crate::models::avatar::AvatarResponse;
use crate::models::shared::{Pagination, validate_id};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Per-student upload serialisation.
///
/// Holding the guard across the file write and the row upsert means the file
/// on disk and the avatar row always describe the same upload.
#[derive(Default)]
pub struct UploadLocks {
    inner: DashMap<i32, Arc<Mutex<()>>>,
}

impl UploadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, student_id: i32) -> OwnedMutexGuard<()> {
        let lock = self.inner.entry(student_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry of a student that no longer exists.
    pub fn forget(&self, student_id: i32) {
        self.inner.remove(&student_id);
    }
}

/// An uploaded avatar image as received from the client.
pub struct AvatarUpload {
    pub file_name: String,
    /// Declared content type of the part, if any.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// An opened avatar file plus the metadata stored for it.
pub struct AvatarFile {
    pub reader: BoxReader,
    pub media_type: String,
    pub file_size: i64,
}

pub struct AvatarService<'a, C: ConnectionTrait> {
    conn: &'a C,
    store: &'a dyn FileStore,
    max_upload_size: u64,
}

impl<'a, C: ConnectionTrait> AvatarService<'a, C> {
    pub fn new(conn: &'a C, store: &'a dyn FileStore, max_upload_size: u64) -> Self {
        Self {
            conn,
            store,
            max_upload_size,
        }
    }

    /// Store `upload` as the avatar of `student_id`, replacing any previous one.
    pub async fn upload(
        &self,
        locks: &UploadLocks,
        student_id: i32,
        upload: AvatarUpload,
    ) -> Result<avatar::Model, AppError> {
        validate_id(student_id, "student")?;
        if upload.data.is_empty() {
            return Err(AppError::InvalidArgument(
                "File cannot be null or empty".into(),
            ));
        }
        if upload.data.len() as u64 > self.max_upload_size {
            return Err(too_big(self.max_upload_size));
        }
        let ext = filename::extension(&upload.file_name).map_err(|e| {
            AppError::InvalidArgument(format!(
                "Invalid file name: {:?} ({})",
                upload.file_name,
                e.message()
            ))
        })?;
        let media_type = resolve_media_type(upload.content_type.as_deref(), &upload.file_name);

        // Checked under the lock so a concurrent student delete cannot leave an orphaned file.
        let guard = locks.acquire(student_id).await;
        let student = student::Entity::find_by_id(student_id)
            .one(self.conn)
            .await?;
        if student.is_none() {
            drop(guard);
            locks.forget(student_id);
            return Err(AppError::NotFound(format!(
                "Student not found: {student_id}"
            )));
        }

        let stored_name = format!("{student_id}.{ext}");
        let path = self.store.put(&stored_name, &upload.data).await?;
        let file_size = upload.data.len() as i64;

        let existing = avatar::Entity::find()
            .filter(avatar::Column::StudentId.eq(student_id))
            .one(self.conn)
            .await?;
        let mut active = match existing {
            Some(model) => model.into_active_model(),
            None => avatar::ActiveModel {
                student_id: Set(student_id),
                ..Default::default()
            },
        };
        active.file_path = Set(path.display().to_string());
        active.file_size = Set(file_size);
        active.media_type = Set(media_type);
        active.data = Set(upload.data);
        let model = active.save(self.conn).await?.try_into_model()?;

        info!(
            student_id,
            size = file_size,
            path = %model.file_path,
            "Stored avatar"
        );
        Ok(model)
    }

    pub async fn find_avatar(&self, student_id: i32) -> Result<avatar::Model, AppError> {
        validate_id(student_id, "student")?;
        avatar::Entity::find()
            .filter(avatar::Column::StudentId.eq(student_id))
            .one(self.conn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Avatar not found for student: {student_id}"))
            })
    }

    /// A 1-based page of avatar metadata, ordered by avatar id.
    pub async fn list_avatars(
        &self,
        page: i64,
        size: i64,
    ) -> Result<(Vec<AvatarResponse>, Pagination), AppError> {
        if page < 1 || size < 1 {
            return Err(AppError::InvalidArgument(format!(
                "Page number and size must be positive (page={page}, size={size})"
            )));
        }
        let (page, per_page) = (page as u64, size as u64);

        let total = avatar::Entity::find()
            .paginate(self.conn, per_page)
            .num_items()
            .await?;

        // An offset past the last row, including one that overflows, is an empty page.
        let offset = (page - 1).checked_mul(per_page).filter(|&o| o < total);
        let data = match offset {
            Some(offset) => self.page_of_avatars(offset, per_page).await?,
            None => Vec::new(),
        };

        Ok((
            data,
            Pagination {
                page,
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        ))
    }

    async fn page_of_avatars(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AvatarResponse>, AppError> {
        Ok(avatar::Entity::find()
            .select_only()
            .column(avatar::Column::Id)
            .column(avatar::Column::StudentId)
            .column(avatar::Column::FilePath)
            .column(avatar::Column::FileSize)
            .column(avatar::Column::MediaType)
            .order_by_asc(avatar::Column::Id)
            .offset(Some(offset))
            .limit(Some(limit))
            .into_model::<AvatarResponse>()
            .all(self.conn)
            .await?)
    }

    /// The in-row preview bytes and their media type.
    pub async fn preview(&self, student_id: i32) -> Result<(Vec<u8>, String), AppError> {
        let avatar = self.find_avatar(student_id).await?;
        Ok((avatar.data, avatar.media_type))
    }

    /// Open the full avatar file. A row whose file has vanished is reported as not found.
    pub async fn open_file(&self, student_id: i32) -> Result<AvatarFile, AppError> {
        let avatar = self.find_avatar(student_id).await?;
        let location = Path::new(&avatar.file_path);

        if !self.store.exists(location).await? {
            return Err(AppError::NotFound(format!(
                "Avatar file not found: {}",
                avatar.file_path
            )));
        }
        let reader = self.store.get_stream(location).await?;

        Ok(AvatarFile {
            reader,
            media_type: avatar.media_type,
            file_size: avatar.file_size,
        })
    }
}

pub fn too_big(max_upload_size: u64) -> AppError {
    AppError::InvalidArgument(format!(
        "File is too big. Maximum size is {}KB",
        max_upload_size / 1024
    ))
}

fn resolve_media_type(declared: Option<&str>, file_name: &str) -> String {
    declared
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_string)
        .or_else(|| {
            mime_guess::from_path(file_name)
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}
