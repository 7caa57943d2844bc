use serde::Serialize;

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a path or body id (must be > 0).
pub fn validate_id(id: i32, entity: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "Invalid {entity} id: {id}"
        )));
    }
    Ok(())
}

/// Validate a required text field (non-blank after trimming).
pub fn validate_required_text(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!(
            "{what} cannot be null or empty"
        )));
    }
    Ok(())
}
