use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::info;

use crate::entity::{avatar, faculty, student};
use crate::error::AppError;
use crate::models::shared::{escape_like, validate_id};
use crate::models::student::validate_student;

/// A student row joined with its faculty, if any.
pub type StudentWithFaculty = (student::Model, Option<faculty::Model>);

/// Prior state of a deleted student.
#[derive(Debug)]
pub struct DeletedStudent {
    pub student: student::Model,
    pub faculty: Option<faculty::Model>,
    /// Avatar row removed together with the student. Its file is still on disk.
    pub avatar: Option<avatar::Model>,
}

pub struct StudentService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> StudentService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        name: &str,
        age: i32,
        faculty_id: Option<i32>,
    ) -> Result<StudentWithFaculty, AppError> {
        validate_student(name, age)?;
        let faculty = self.find_faculty(faculty_id).await?;

        let model = student::ActiveModel {
            name: Set(name.trim().to_string()),
            age: Set(age),
            faculty_id: Set(faculty_id),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(student_id = model.id, "Created student");
        Ok((model, faculty))
    }

    pub async fn get(&self, id: i32) -> Result<StudentWithFaculty, AppError> {
        validate_id(id, "student")?;
        student::Entity::find_by_id(id)
            .find_also_related(faculty::Entity)
            .one(self.conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list_all(&self) -> Result<Vec<StudentWithFaculty>, AppError> {
        Ok(student::Entity::find()
            .find_also_related(faculty::Entity)
            .order_by_asc(student::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Replace every field of an existing student.
    pub async fn update(
        &self,
        id: i32,
        name: &str,
        age: i32,
        faculty_id: Option<i32>,
    ) -> Result<StudentWithFaculty, AppError> {
        validate_id(id, "student")?;
        validate_student(name, age)?;

        let existing = student::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| not_found(id))?;
        let faculty = self.find_faculty(faculty_id).await?;

        let mut active = existing.into_active_model();
        active.name = Set(name.trim().to_string());
        active.age = Set(age);
        active.faculty_id = Set(faculty_id);
        let model = active.update(self.conn).await?;

        info!(student_id = id, "Updated student");
        Ok((model, faculty))
    }

    /// Delete a student and its avatar row.
    pub async fn delete(&self, id: i32) -> Result<DeletedStudent, AppError> {
        let (student, faculty) = self.get(id).await?;

        let avatar = avatar::Entity::find()
            .filter(avatar::Column::StudentId.eq(id))
            .one(self.conn)
            .await?;
        if let Some(ref a) = avatar {
            avatar::Entity::delete_by_id(a.id).exec(self.conn).await?;
        }
        student::Entity::delete_by_id(id).exec(self.conn).await?;

        info!(student_id = id, had_avatar = avatar.is_some(), "Deleted student");
        Ok(DeletedStudent {
            student,
            faculty,
            avatar,
        })
    }

    pub async fn find_by_age(&self, age: i32) -> Result<Vec<StudentWithFaculty>, AppError> {
        validate_age(age)?;
        Ok(student::Entity::find()
            .filter(student::Column::Age.eq(age))
            .find_also_related(faculty::Entity)
            .order_by_asc(student::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Students with `min <= age <= max`.
    pub async fn find_by_age_between(
        &self,
        min: i32,
        max: i32,
    ) -> Result<Vec<StudentWithFaculty>, AppError> {
        validate_age(min)?;
        validate_age(max)?;
        if min > max {
            return Err(AppError::InvalidArgument(
                "Min age cannot be greater than max age".into(),
            ));
        }
        Ok(student::Entity::find()
            .filter(student::Column::Age.between(min, max))
            .find_also_related(faculty::Entity)
            .order_by_asc(student::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(student::Entity::find().count(self.conn).await?)
    }

    /// Mean age of all students, `0.0` when there are none.
    pub async fn average_age(&self) -> Result<f64, AppError> {
        let avg: Option<Option<f64>> = student::Entity::find()
            .select_only()
            .column_as(Expr::cust("CAST(AVG(\"age\") AS DOUBLE PRECISION)"), "avg")
            .into_tuple()
            .one(self.conn)
            .await?;
        Ok(avg.flatten().unwrap_or(0.0))
    }

    /// The five most recently created students, newest first.
    pub async fn last_five(&self) -> Result<Vec<StudentWithFaculty>, AppError> {
        Ok(student::Entity::find()
            .find_also_related(faculty::Entity)
            .order_by_desc(student::Column::Id)
            .limit(5)
            .all(self.conn)
            .await?)
    }

    /// `Ok(None)` when the student exists but has no faculty.
    pub async fn faculty_of(&self, id: i32) -> Result<Option<faculty::Model>, AppError> {
        Ok(self.get(id).await?.1)
    }

    /// Upper-cased names starting with `prefix` (case-insensitive), sorted.
    pub async fn names_starting_with(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let prefix = prefix.trim().to_uppercase();
        let rows: Vec<String> = student::Entity::find()
            .select_only()
            .column(student::Column::Name)
            .filter(
                Expr::expr(Func::upper(Expr::col(student::Column::Name)))
                    .like(LikeExpr::new(format!("{}%", escape_like(&prefix))).escape('\\')),
            )
            .into_tuple()
            .all(self.conn)
            .await?;

        // SQL UPPER only folds ASCII on SQLite; re-check with Unicode rules.
        let mut names: Vec<String> = rows
            .into_iter()
            .map(|n| n.to_uppercase())
            .filter(|n| n.starts_with(&prefix))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn find_faculty(
        &self,
        faculty_id: Option<i32>,
    ) -> Result<Option<faculty::Model>, AppError> {
        let Some(fid) = faculty_id else {
            return Ok(None);
        };
        validate_id(fid, "faculty")?;
        let faculty = faculty::Entity::find_by_id(fid)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Faculty not found: {fid}")))?;
        Ok(Some(faculty))
    }
}

fn validate_age(age: i32) -> Result<(), AppError> {
    if age <= 0 {
        return Err(AppError::InvalidArgument(
            "Student age must be positive".into(),
        ));
    }
    Ok(())
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Student not found: {id}"))
}
