//! # Validation Module
//!
//! Input validation rules applied before any business logic or network
//! call. The backend re-validates everything; these checks exist so forms
//! can give immediate inline feedback.

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a cedula (Venezuelan national ID).
///
/// ## Rules
/// - Optional nationality prefix `V`/`E` (with or without a dash)
/// - 6 to 9 digits
///
/// Accepted: `12345678`, `V-12345678`, `E12345678`.
pub fn validate_cedula(cedula: &str) -> ValidationResult<()> {
    let cedula = cedula.trim();
    if cedula.is_empty() {
        return Err(ValidationError::Required { field: "cedula" });
    }

    let digits = cedula
        .trim_start_matches(['V', 'E', 'v', 'e'])
        .trim_start_matches('-');

    if !(6..=9).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cedula",
            reason: "expected an optional V/E prefix followed by 6-9 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an item quantity for cart and sale operations.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates login credentials are present. Credential correctness is the
/// backend's call; this only prevents a guaranteed-to-fail request.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required { field: "username" });
    }
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    Ok(())
}

/// Validates a client full name for registration.
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required { field: "full_name" });
    }
    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "full_name",
            max: 200,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cedula_accepted_forms() {
        assert!(validate_cedula("12345678").is_ok());
        assert!(validate_cedula("V-12345678").is_ok());
        assert!(validate_cedula("E12345678").is_ok());
        assert!(validate_cedula("v-123456").is_ok());
    }

    #[test]
    fn test_cedula_rejected_forms() {
        assert!(validate_cedula("").is_err());
        assert!(validate_cedula("12345").is_err()); // too short
        assert!(validate_cedula("1234567890").is_err()); // too long
        assert!(validate_cedula("V-12A45678").is_err()); // letters inside
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_credentials_presence() {
        assert!(validate_credentials("maria", "secret").is_ok());
        assert!(validate_credentials("", "secret").is_err());
        assert!(validate_credentials("maria", "").is_err());
    }
}
