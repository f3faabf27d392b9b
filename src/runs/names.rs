//! Syntax checks for run names and group names.

use super::{Result, RunsError};

/// A run name is one or more ASCII letters followed by one or more ASCII
/// digits, e.g. `U456` or `C1234`.
pub fn validate_run_name(name: &str) -> Result<()> {
    let digits_start = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    let (letters, digits) = name.split_at(digits_start);

    let valid = !letters.is_empty()
        && !digits.is_empty()
        && letters.chars().all(|c| c.is_ascii_alphabetic())
        && digits.chars().all(|c| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(RunsError::InvalidRunName { name: name.to_string() })
    }
}

/// Validate a group name and return it trimmed.
///
/// Groups travel in URL paths and query strings of servers that store them
/// as Latin-1, so only Latin-1 letters and digits plus `-` and `_` pass.
pub fn validate_group_name(group: &str) -> Result<String> {
    let trimmed = group.trim();
    let valid = !trimmed.is_empty()
        && trimmed.chars().all(|c| {
            (c as u32) <= 0xFF && (c.is_alphanumeric() || c == '-' || c == '_')
        });

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(RunsError::InvalidGroupName { group: group.to_string() })
    }
}
