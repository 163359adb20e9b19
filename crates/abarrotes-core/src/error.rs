//! # Error Types
//!
//! Domain-specific error types for abarrotes-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  abarrotes-core errors (this file)                                     │
//! │  ├── CoreError        - Cart and sale composition errors               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  abarrotes-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → presentation layer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The product is not part of the cart.
    ///
    /// ## When This Occurs
    /// - Adjusting the quantity of a line that was already removed
    /// - Removing the same line twice
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),

    /// A sale was requested for a cart without line items.
    #[error("Cannot commit a sale from an empty cart")]
    EmptyCart,

    /// Adding one more unit would exceed the per-entry quantity limit.
    #[error("Quantity of product {product_id} cannot exceed {max}")]
    QuantityLimit { product_id: i64, max: i64 },

    /// The cart already holds the maximum number of distinct products.
    #[error("Cart cannot have more than {max} products")]
    CartFull { max: usize },

    /// A product appears in more than one entry of a cart being restored.
    #[error("Product {0} appears more than once in the cart")]
    DuplicateEntry(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything touches the database.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., "12,5" typed into a price field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error for the given field.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::NotInCart(7).to_string(),
            "Product 7 is not in the cart"
        );
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Cannot commit a sale from an empty cart"
        );
        assert_eq!(
            CoreError::QuantityLimit {
                product_id: 3,
                max: 999
            }
            .to_string(),
            "Quantity of product 3 cannot exceed 999"
        );
        assert_eq!(
            CoreError::CartFull { max: 100 }.to_string(),
            "Cart cannot have more than 100 products"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");

        let err = ValidationError::invalid_format("salePrice", "not a number");
        assert_eq!(err.to_string(), "salePrice has invalid format: not a number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
