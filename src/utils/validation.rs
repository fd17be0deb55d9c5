//! Input validation primitives.
//!
//! Small helpers that turn common argument checks into
//! `Error::validation_invalid_argument` results.

use crate::error::{Error, Result};
use std::path::Path;

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None))
    } else {
        Ok(trimmed)
    }
}

/// Require a component identifier: non-empty, ASCII letters and digits only.
pub fn require_identifier<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = require_non_empty(value, field, "Component name cannot be empty")?;

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation_invalid_argument(
            field,
            format!(
                "Component name '{}' must be PascalCase (letters and digits only)",
                trimmed
            ),
            Some(trimmed.to_string()),
        ));
    }

    Ok(trimmed)
}

/// Normalize a path segment (provider, kind folder) and reject traversal.
///
/// Trims, lowercases and strips underscores: `Aws_Lambda` becomes `awslambda`.
pub fn normalize_segment(value: &str, field: &str) -> Result<String> {
    let normalized = value.trim().to_lowercase().replace('_', "");

    if normalized.is_empty() {
        return Err(Error::validation_invalid_argument(
            field,
            format!("{} cannot be empty", field),
            None,
        ));
    }

    if normalized.contains("..") || normalized.starts_with('/') || normalized.starts_with('~') {
        return Err(Error::validation_invalid_argument(
            field,
            "Invalid segment: path traversal not allowed",
            Some(value.to_string()),
        ));
    }

    Ok(normalized)
}

/// Require a relative file path that stays below its base directory.
///
/// Subdirectories are allowed (`resources/sg.go`); absolute paths, `~` and
/// any `..` are not.
pub fn require_relative_path(value: &str, field: &str) -> Result<String> {
    let trimmed = require_non_empty(value, field, "File name cannot be empty")?;

    let escapes = trimmed.starts_with('/')
        || trimmed.starts_with('~')
        || trimmed.contains("..")
        || Path::new(trimmed).is_absolute();
    if escapes {
        return Err(Error::validation_invalid_argument(
            field,
            "Invalid file name: path traversal not allowed",
            Some(trimmed.to_string()),
        ));
    }

    Ok(trimmed.to_string())
}
