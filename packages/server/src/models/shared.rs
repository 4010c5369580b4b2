use std::collections::HashSet;

use crate::error::AppError;

/// Validate a trimmed display name (1-256 Unicode characters).
pub fn validate_name(name: &str, field: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation(format!(
            "{field} must be 1-256 characters"
        )));
    }
    Ok(())
}

/// Validate an optional capacity (must be >= 1 when present).
pub fn validate_optional_capacity(capacity: Option<i32>, field: &str) -> Result<(), AppError> {
    if let Some(capacity) = capacity
        && capacity < 1
    {
        return Err(AppError::Validation(format!("{field} must be >= 1")));
    }
    Ok(())
}

/// Validate a list of table numbers for a bulk insert (positive, no duplicates).
pub fn validate_table_numbers(tables: &[i32]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for &table in tables {
        if table < 1 {
            return Err(AppError::Validation("Table number must be >= 1".into()));
        }
        if !seen.insert(table) {
            return Err(AppError::Validation(format!(
                "Duplicate table number {table}"
            )));
        }
    }
    Ok(())
}
