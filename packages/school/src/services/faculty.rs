use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::*;
use tracing::info;

use crate::entity::{faculty, student};
use crate::error::AppError;
use crate::models::faculty::validate_faculty;
use crate::models::shared::validate_id;

pub struct FacultyService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FacultyService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str, color: &str) -> Result<faculty::Model, AppError> {
        validate_faculty(name, color)?;
        let model = faculty::ActiveModel {
            name: Set(name.trim().to_string()),
            color: Set(color.trim().to_string()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        info!(faculty_id = model.id, "Created faculty");
        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<faculty::Model, AppError> {
        validate_id(id, "faculty")?;
        faculty::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// A faculty together with its students, ordered by id.
    pub async fn get_with_students(
        &self,
        id: i32,
    ) -> Result<(faculty::Model, Vec<student::Model>), AppError> {
        let faculty = self.get(id).await?;
        let students = self.students_of_existing(id).await?;
        Ok((faculty, students))
    }

    /// Filter by exact name or, failing that, exact color (both case-insensitive).
    /// Without either filter every faculty is returned.
    pub async fn list(
        &self,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Vec<faculty::Model>, AppError> {
        let mut select = faculty::Entity::find();

        let name = name.map(str::trim).filter(|s| !s.is_empty());
        let color = color.map(str::trim).filter(|s| !s.is_empty());
        if let Some(name) = name {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(faculty::Column::Name))).eq(name.to_lowercase()),
            );
        } else if let Some(color) = color {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(faculty::Column::Color)))
                    .eq(color.to_lowercase()),
            );
        }

        Ok(select
            .order_by_asc(faculty::Column::Id)
            .all(self.conn)
            .await?)
    }

    pub async fn students_of(&self, id: i32) -> Result<Vec<student::Model>, AppError> {
        self.get(id).await?;
        self.students_of_existing(id).await
    }

    /// Name with the most characters; the lowest id wins a tie.
    pub async fn longest_name(&self) -> Result<String, AppError> {
        let names: Vec<String> = faculty::Entity::find()
            .select_only()
            .column(faculty::Column::Name)
            .order_by_asc(faculty::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await?;

        names
            .into_iter()
            .reduce(|best, n| {
                if n.chars().count() > best.chars().count() {
                    n
                } else {
                    best
                }
            })
            .ok_or_else(|| AppError::NotFound("No faculties found".into()))
    }

    /// Replace every field of an existing faculty.
    pub async fn update(
        &self,
        id: i32,
        name: &str,
        color: &str,
    ) -> Result<faculty::Model, AppError> {
        validate_faculty(name, color)?;
        let existing = self.get(id).await?;

        let mut active = existing.into_active_model();
        active.name = Set(name.trim().to_string());
        active.color = Set(color.trim().to_string());
        let model = active.update(self.conn).await?;

        info!(faculty_id = id, "Updated faculty");
        Ok(model)
    }

    /// Delete a faculty, detaching its students first.
    pub async fn delete(&self, id: i32) -> Result<faculty::Model, AppError> {
        let existing = self.get(id).await?;

        let detached = student::Entity::update_many()
            .col_expr(student::Column::FacultyId, Expr::value(Option::<i32>::None))
            .filter(student::Column::FacultyId.eq(id))
            .exec(self.conn)
            .await?
            .rows_affected;
        faculty::Entity::delete_by_id(id).exec(self.conn).await?;

        info!(faculty_id = id, detached, "Deleted faculty");
        Ok(existing)
    }

    async fn students_of_existing(&self, id: i32) -> Result<Vec<student::Model>, AppError> {
        Ok(student::Entity::find()
            .filter(student::Column::FacultyId.eq(id))
            .order_by_asc(student::Column::Id)
            .all(self.conn)
            .await?)
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Faculty not found: {id}"))
}
