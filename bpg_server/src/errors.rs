use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bkash_ipn::IpnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("The message type header ({header}) does not match the message type ({body})")]
    MessageTypeMismatch { header: String, body: String },
    #[error("{0}")]
    NotificationRejected(#[from] IpnError),
    #[error("The notification does not match the gateway's record of the transaction. {0}")]
    CorroborationFailed(String),
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
    #[error("Could not confirm the subscription. {0}")]
    SubscriptionConfirmationFailed(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MessageTypeMismatch { .. } => StatusCode::BAD_REQUEST,
            Self::NotificationRejected(e) => match e {
                IpnError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
                IpnError::UntrustedSource(_) => StatusCode::FORBIDDEN,
                IpnError::SignatureInvalid(_) => StatusCode::FORBIDDEN,
                // Asks the relay to deliver the message again later.
                IpnError::FetchFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::CorroborationFailed(_) => StatusCode::FORBIDDEN,
            Self::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SubscriptionConfirmationFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}
