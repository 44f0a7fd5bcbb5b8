use thiserror::Error;

#[derive(Debug, Error)]
pub enum BkashApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Empty required field: {0}")]
    EmptyRequiredField(&'static str),
    #[error("Invalid mode value '{actual}'. Expected '{expected}'")]
    InvalidMode { expected: &'static str, actual: String },
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not obtain an access token. {0}")]
    AuthenticationFailed(String),
    #[error("The gateway rejected the request. Error {code}. {message}")]
    GatewayError { code: String, message: String },
}
