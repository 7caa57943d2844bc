use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::entity::avatar;

use super::shared::Pagination;

/// Avatar metadata. The in-row preview bytes are served separately.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct AvatarResponse {
    pub id: i32,
    pub student_id: i32,
    /// Location of the full file on the server.
    #[schema(example = "./avatars/1.jpg")]
    pub file_path: String,
    /// Declared upload size in bytes.
    #[schema(example = 9)]
    pub file_size: i64,
    #[schema(example = "image/jpeg")]
    pub media_type: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AvatarListResponse {
    pub data: Vec<AvatarResponse>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AvatarPageQuery {
    /// Page number (1-based).
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
}

impl From<avatar::Model> for AvatarResponse {
    fn from(m: avatar::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            file_path: m.file_path,
            file_size: m.file_size,
            media_type: m.media_type,
        }
    }
}
