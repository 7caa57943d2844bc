use serde::{Deserialize, Serialize};

use crate::entity::{faculty, student};
use crate::error::AppError;

use super::faculty::SimpleFacultyResponse;
use super::shared::validate_required_text;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    #[schema(example = "Harry")]
    pub name: String,
    #[schema(example = 17)]
    pub age: i32,
    /// Faculty to enroll the student in.
    pub faculty_id: Option<i32>,
}

/// Full replacement of an existing student.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateStudentRequest {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub faculty_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub faculty: Option<SimpleFacultyResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SimpleStudentResponse {
    pub id: i32,
    pub name: String,
    pub age: i32,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StudentNamesQuery {
    /// Case-insensitive name prefix. Defaults to `A`.
    pub prefix: Option<String>,
}

impl StudentResponse {
    pub fn new(student: student::Model, faculty: Option<faculty::Model>) -> Self {
        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            faculty: faculty.map(SimpleFacultyResponse::from),
        }
    }
}

impl From<student::Model> for SimpleStudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            age: m.age,
        }
    }
}

pub fn validate_student(name: &str, age: i32) -> Result<(), AppError> {
    validate_required_text(name, "Student name")?;
    if age <= 0 {
        return Err(AppError::InvalidArgument(
            "Student age must be positive".into(),
        ));
    }
    Ok(())
}

/// Parse an inclusive `{min}-{max}` age range path segment.
pub fn parse_age_range(range: &str) -> Result<(i32, i32), AppError> {
    let invalid = || AppError::InvalidArgument(format!("Invalid age range: {range}"));
    let (min, max) = range.split_once('-').ok_or_else(invalid)?;
    let min = min.trim().parse::<i32>().map_err(|_| invalid())?;
    let max = max.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok((min, max))
}
