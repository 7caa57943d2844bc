use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub age: i32,

    /// NULL when the student is not assigned to a faculty.
    #[sea_orm(indexed)]
    pub faculty_id: Option<i32>,
    #[sea_orm(belongs_to, from = "faculty_id", to = "id")]
    pub faculty: Option<super::faculty::Entity>,

    #[sea_orm(has_one)]
    pub avatar: HasOne<super::avatar::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
