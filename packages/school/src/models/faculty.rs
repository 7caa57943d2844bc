use serde::{Deserialize, Serialize};

use crate::entity::{faculty, student};
use crate::error::AppError;

use super::shared::validate_required_text;
use super::student::SimpleStudentResponse;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateFacultyRequest {
    #[schema(example = "Gryffindor")]
    pub name: String,
    #[schema(example = "red")]
    pub color: String,
}

/// Full replacement of an existing faculty.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateFacultyRequest {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FacultyResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub students: Vec<SimpleStudentResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SimpleFacultyResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct FacultyListQuery {
    /// Exact name, case-insensitive. Takes precedence over `color`.
    pub name: Option<String>,
    /// Exact color, case-insensitive.
    pub color: Option<String>,
}

impl FacultyResponse {
    pub fn new(faculty: faculty::Model, students: Vec<student::Model>) -> Self {
        Self {
            id: faculty.id,
            name: faculty.name,
            color: faculty.color,
            students: students.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<faculty::Model> for SimpleFacultyResponse {
    fn from(m: faculty::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            color: m.color,
        }
    }
}

pub fn validate_faculty(name: &str, color: &str) -> Result<(), AppError> {
    validate_required_text(name, "Faculty name")?;
    validate_required_text(color, "Faculty color")?;
    Ok(())
}
