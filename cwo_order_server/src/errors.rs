use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use cwo_order_engine::{AccountApiError, OrderManagerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    OrderConversionError(#[from] OrderConversionError),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Order ID conflict. {0}")]
    OrderIdConflict(String),
    #[error("{0}")]
    BusinessRuleViolation(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Payment verification failed. {0}")]
    PaymentVerificationFailed(String),
    #[error("Payment gateway error. {0}")]
    PaymentGatewayError(String),
    #[error("Admin authentication required")]
    Unauthorized,
    #[error("Insufficient permissions. {0}")]
    InsufficientPermissions(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::OrderConversionError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::BusinessRuleViolation(_) => StatusCode::BAD_REQUEST,
            Self::PaymentVerificationFailed(_) => StatusCode::BAD_REQUEST,
            Self::OrderIdConflict(_) => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.to_string() }).to_string())
    }
}

/// A checkout payload failed validation. The message names the offending field and is
/// surfaced verbatim to the caller.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct OrderConversionError(pub String);

impl From<OrderManagerError> for ServerError {
    fn from(e: OrderManagerError) -> Self {
        match e {
            OrderManagerError::OrderNotFound(oid) => Self::NoRecordFound(format!("Order {oid} not found")),
            OrderManagerError::OrderIdConflict => {
                Self::OrderIdConflict("Failed to generate unique order ID. Please try again.".to_string())
            },
            OrderManagerError::CannotDeleteDelivered(_) => {
                Self::BusinessRuleViolation("Cannot delete delivered orders".to_string())
            },
            OrderManagerError::InvalidStatusTransition { .. } |
            OrderManagerError::PaymentRequired { .. } |
            OrderManagerError::StatusUnchanged(_) => Self::BusinessRuleViolation(e.to_string()),
            OrderManagerError::PaymentNotFound(id) => {
                Self::NoRecordFound(format!("No payment recorded for gateway order {id}"))
            },
            OrderManagerError::StoreError(e) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::UserNotFound(phone) => Self::NoRecordFound(format!("User {phone} not found")),
            AccountApiError::UserHasOrders { .. } => Self::BusinessRuleViolation(e.to_string()),
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AccountApiError::QueryError(e) => Self::InvalidRequestBody(e),
        }
    }
}
