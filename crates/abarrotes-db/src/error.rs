//! # Database Error Types
//!
//! Error types for Catalog Store and Sales Ledger operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      ValidationError / CoreError            │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError::kind() → Validation | NotFound | Conflict | Storage          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation layer: re-prompt, "not found", "already used", or        │
//! │  generic failure                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use abarrotes_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `get`, `update`, `delete` with an id that has no row
    /// - `items` for a sale that was never committed
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating a product with a barcode another product already has
    /// - Updating a product to such a barcode
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Caller-supplied data failed a precondition. Nothing was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Cart-level failure surfaced through a store operation.
    ///
    /// Never holds `CoreError::Validation`: that converts to
    /// [`DbError::Validation`].
    #[error(transparent)]
    Core(CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, missing directory)
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A configuration value could not be used.
    ///
    /// ## When This Occurs
    /// - `ABARROTES_DB_MAX_CONNECTIONS` is not a positive integer
    /// - No home directory to derive the default database path from
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed (includes CHECK constraint failures).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Timed out waiting for the connection.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// The four outcomes the presentation layer reacts to.
///
/// ```text
/// Validation → re-prompt the user, nothing changed
/// NotFound   → the id is stale, refresh the view
/// Conflict   → "barcode already in use"
/// Storage    → generic failure, not retried
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } | DbError::Core(CoreError::NotInCart(_)) => {
                ErrorKind::NotFound
            }
            DbError::Validation(_) | DbError::Core(_) => ErrorKind::Validation,
            DbError::UniqueViolation { .. } => ErrorKind::Conflict,
            DbError::ConnectionFailed(_)
            | DbError::InvalidConfig(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::Storage,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: products.barcode"
                if let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    let field = columns
                        .split('.')
                        .last()
                        .unwrap_or(columns)
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Cart validation failures are reported like any other validation failure.
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(inner) => DbError::Validation(inner),
            other => DbError::Core(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DbError::not_found("Product", 3).kind(), ErrorKind::NotFound);
        assert_eq!(
            DbError::duplicate("barcode", "750").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DbError::from(ValidationError::required("name")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(DbError::from(CoreError::EmptyCart).kind(), ErrorKind::Validation);
        assert_eq!(DbError::from(CoreError::NotInCart(1)).kind(), ErrorKind::NotFound);
        assert_eq!(
            DbError::from(CoreError::QuantityLimit {
                product_id: 1,
                max: 999
            })
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::Storage);
        assert_eq!(
            DbError::QueryFailed("CHECK constraint failed".into()).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_core_validation_becomes_db_validation() {
        let err = DbError::from(CoreError::Validation(ValidationError::required("name")));
        assert!(matches!(err, DbError::Validation(ValidationError::Required { .. })));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = DbError::from(CoreError::EmptyCart);
        assert!(matches!(err, DbError::Core(CoreError::EmptyCart)));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("Product", 42).to_string(),
            "Product not found: 42"
        );
        assert_eq!(
            DbError::duplicate("barcode", "7501").to_string(),
            "Duplicate barcode: '7501' already exists"
        );
        assert_eq!(
            DbError::from(CoreError::EmptyCart).to_string(),
            "Cannot commit a sale from an empty cart"
        );
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"NOT_FOUND\"");
    }
}
