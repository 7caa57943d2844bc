use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "avatar")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// At most one avatar per student.
    #[sea_orm(unique)]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    /// Location of the full-resolution file on disk.
    pub file_path: String,

    /// Size declared by the upload, in bytes.
    pub file_size: i64,

    /// MIME type declared by the upload.
    pub media_type: String,

    /// In-row copy of the uploaded bytes, served by the preview endpoint.
    pub data: Vec<u8>,
}

impl ActiveModelBehavior for ActiveModel {}
