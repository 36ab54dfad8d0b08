//! # App Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the register                           │
//! │                                                                         │
//! │  caja sell 3*A1 --pay cash:50                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command / Service                                               │  │
//! │  │  Result<T, AppError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::Corrupt { .. } ──────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Core Error? ─── CoreError::Overpayment ─────── AppError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: error [PAYMENT_ERROR]: transfer payment of $50.00 exceeds ... │
//! │  exit status 1                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use caja_core::{CoreError, ValidationError};
use caja_store::StoreError;

use crate::config::ConfigError;

/// Error returned from register commands.
///
/// ## Serialization
/// With `--json` output a failure prints:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: A9"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, customer, ticket or report not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// More than one product matched the input
    AmbiguousMatch,

    /// Data directory read or write failed
    StorageError,

    /// Ticket or ledger rule violated
    BusinessLogic,

    /// Payment rejected or incomplete
    PaymentError,

    /// Login failed
    AuthError,

    /// Command needs a logged-in cashier
    NoActiveSession,

    /// Configuration file or value invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::AmbiguousMatch => "AMBIGUOUS_MATCH",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::AuthError => "AUTH_ERROR",
            ErrorCode::NoActiveSession => "NO_ACTIVE_SESSION",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn no_session() -> Self {
        AppError::new(
            ErrorCode::NoActiveSession,
            "No cashier is logged in; run `caja login` first",
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Result type for register commands.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AppError::not_found(&entity, &id),
            StoreError::Duplicate { field, value } => AppError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            StoreError::Corrupt { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "Corrupt document");
                AppError::new(
                    ErrorCode::StorageError,
                    format!("{} is not valid JSON ({}); fix or restore it", path.display(), source),
                )
            }
            StoreError::Io { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "File access failed");
                AppError::new(
                    ErrorCode::StorageError,
                    format!("Cannot access {}: {}", path.display(), source),
                )
            }
            StoreError::Serialize(e) => {
                tracing::error!("Serialization failed: {}", e);
                AppError::internal("Could not serialize data")
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::LineNotFound(_) => ErrorCode::NotFound,
            CoreError::AmbiguousMatch { .. } => ErrorCode::AmbiguousMatch,
            CoreError::NotWeighable { .. }
            | CoreError::WeightRequired { .. }
            | CoreError::FractionalQuantity { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::Overpayment { .. }
            | CoreError::PaymentIncomplete { .. }
            | CoreError::CustomerRequired
            | CoreError::InvalidPaymentAmount { .. } => ErrorCode::PaymentError,
            CoreError::InvalidCredentials => ErrorCode::AuthError,
            CoreError::InvalidTicketState { .. }
            | CoreError::EmptyTicket
            | CoreError::TicketTooLarge { .. }
            | CoreError::DebtExceeded { .. }
            | CoreError::CustomerHasDebt { .. } => ErrorCode::BusinessLogic,
        };
        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };
        AppError::new(code, message)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::{Money, PaymentMethod};

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: AppError = CoreError::ProductNotFound("A9".to_string()).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = CoreError::Overpayment {
            method: PaymentMethod::Transfer,
            amount: Money::from_cents(5000),
            remaining: Money::from_cents(4000),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(
            err.to_string(),
            "[PAYMENT_ERROR] transfer payment of $50.00 exceeds remaining $40.00"
        );

        let err: AppError = CoreError::Validation(ValidationError::Required {
            field: "code".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "code is required");
    }

    #[test]
    fn test_store_errors_map_to_codes() {
        let err: AppError = StoreError::not_found("Report", "S1").into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: AppError = StoreError::duplicate("ticket_number", "01-03-2024-1").into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_serializes_code_screaming_snake() {
        let json = serde_json::to_string(&AppError::no_session()).unwrap();
        assert!(json.contains("\"code\":\"NO_ACTIVE_SESSION\""));
    }
}
