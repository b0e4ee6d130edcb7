use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The Razorpay API keys are not configured")]
    NotConfigured,
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}
