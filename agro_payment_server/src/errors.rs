use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use agro_payment_engine::FlowError;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    /// A request that failed validation. The message is shown to the caller as is.
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid json")]
    InvalidRequestBody(String),
    #[error("store not found")]
    StoreNotFound,
    #[error("unauthorized")]
    Unauthorized,
    /// The detail is logged when the error is created and is not sent to the caller.
    #[error("db error")]
    BackendError(String),
    #[error("Could not forward the receipt. {0}")]
    NotificationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::StoreNotFound => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotificationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<FlowError> for ServerError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Validation(msg) => Self::BadRequest(msg),
            FlowError::StoreNotFound(_) => Self::StoreNotFound,
            FlowError::Database(msg) => {
                error!("💻️ Database error while handling a request. {msg}");
                Self::BackendError(msg)
            },
            FlowError::Notification(msg) => Self::NotificationError(msg),
        }
    }
}
