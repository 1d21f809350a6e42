//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that an identifier is a non-zero Discord snowflake (decimal `u64`).
///
/// # Examples
///
/// ```ignore
/// validate_snowflake("123456789012345678") // Ok
/// validate_snowflake("0")                  // Err - zero
/// validate_snowflake("12ab")               // Err - not decimal
/// ```
pub fn validate_snowflake(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("snowflake_format");
        err.message = Some("Snowflake must contain only decimal digits".into());
        return Err(err);
    }

    match id.parse::<u64>() {
        Ok(0) => {
            let mut err = ValidationError::new("snowflake_zero");
            err.message = Some("Snowflake must not be zero".into());
            Err(err)
        }
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("snowflake_range");
            err.message = Some(format!("Snowflake does not fit in 64 bits (got {id})").into());
            Err(err)
        }
    }
}
