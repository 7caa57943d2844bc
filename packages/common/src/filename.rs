/// Reasons an uploaded file name cannot be used to derive a storage name.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains `/` or `\`.
    ContainsPathSeparator,
    /// Filename contains null bytes or other control characters.
    ControlCharacter,
    /// Filename starts with a dot.
    Hidden,
    /// No `.` or nothing after the last `.`.
    MissingExtension,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "file name is empty",
            Self::ContainsPathSeparator => "path separators are not allowed",
            Self::ControlCharacter => "control characters are not allowed",
            Self::Hidden => "hidden files are not allowed",
            Self::MissingExtension => "a file extension is required",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    // Also rejects NUL and CR/LF.
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// Text after the last `.` of a validated flat filename.
pub fn extension(filename: &str) -> Result<&str, FilenameError> {
    let name = validate_flat_filename(filename)?;
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Ok(ext),
        _ => Err(FilenameError::MissingExtension),
    }
}
