//! # Validation Module
//!
//! Input validation utilities for BioScan.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Image source (file picker / camera)                          │
//! │  └── Hands over bytes or a URI                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: SampleReference constructors                                 │
//! │  └── THIS MODULE: payload and URI checks                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Session transitions                                          │
//! │  └── Phase / mode preconditions (Refusal)                              │
//! │                                                                         │
//! │  Settings (probabilities, step cadence) are checked here as well       │
//! │  before the session crate accepts a configuration.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bioscan_core::validation::{validate_image_bytes, validate_probability};
//!
//! assert!(validate_image_bytes(&[0xFF, 0xD8, 0xFF]).is_ok());
//! assert!(validate_probability("mold_probability", 1.5).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_STEP_MS, MAX_UPLOAD_BYTES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// URI schemes accepted for uploaded images.
const ALLOWED_SCHEMES: [&str; 4] = ["data:", "file:", "http:", "https:"];

// =============================================================================
// Image Validators
// =============================================================================

/// Validates raw image bytes.
///
/// ## Rules
/// - Must not be empty
/// - Must not exceed MAX_UPLOAD_BYTES (10 MiB)
pub fn validate_image_bytes(bytes: &[u8]) -> ValidationResult<()> {
    if bytes.is_empty() {
        return Err(ValidationError::Required {
            field: "image".to_string(),
        });
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            field: "image".to_string(),
            max: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Validates an image URI.
///
/// ## Rules
/// - Must not be blank
/// - Must start with `data:`, `file:`, `http:` or `https:`
///
/// ## Example
/// ```rust
/// use bioscan_core::validation::validate_image_uri;
///
/// assert!(validate_image_uri("data:image/jpeg;base64,/9j/4AAQ").is_ok());
/// assert!(validate_image_uri("bread.jpg").is_err());
/// ```
pub fn validate_image_uri(uri: &str) -> ValidationResult<()> {
    let uri = uri.trim();

    if uri.is_empty() {
        return Err(ValidationError::Required {
            field: "image uri".to_string(),
        });
    }

    let lower = uri.to_lowercase();
    if !ALLOWED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return Err(ValidationError::InvalidFormat {
            field: "image uri".to_string(),
            reason: format!("scheme must be one of {:?}", ALLOWED_SCHEMES),
        });
    }

    Ok(())
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Validates a Bernoulli probability.
///
/// ## Rules
/// - Must be finite and within [0, 1]
pub fn validate_probability(field: &str, p: f64) -> ValidationResult<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
        });
    }

    Ok(())
}

/// Validates a status step duration in milliseconds.
///
/// ## Rules
/// - Zero is allowed (instant sequences, useful in tests)
/// - Must not exceed MAX_STEP_MS
pub fn validate_step_ms(field: &str, ms: u64) -> ValidationResult<()> {
    if ms > MAX_STEP_MS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_STEP_MS as f64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_bytes() {
        assert!(validate_image_bytes(&[1, 2, 3]).is_ok());
        assert!(validate_image_bytes(&[]).is_err());

        let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            validate_image_bytes(&oversized),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_image_uri() {
        assert!(validate_image_uri("https://example.com/apple.jpg").is_ok());
        assert!(validate_image_uri("FILE:///home/me/milk.png").is_ok());
        assert!(validate_image_uri("").is_err());
        assert!(validate_image_uri("ftp://old.server/a.jpg").is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability("p", 0.0).is_ok());
        assert!(validate_probability("p", 0.4).is_ok());
        assert!(validate_probability("p", 1.0).is_ok());
        assert!(validate_probability("p", -0.1).is_err());
        assert!(validate_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_step_ms() {
        assert!(validate_step_ms("connect_step_ms", 0).is_ok());
        assert!(validate_step_ms("connect_step_ms", 600).is_ok());
        assert!(validate_step_ms("connect_step_ms", MAX_STEP_MS + 1).is_err());
    }
}
