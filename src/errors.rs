use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidRange(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("vendor request failed: {0}")]
    Vendor(String),

    #[error("malformed data: {0}")]
    DataFormat(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidRange(_) => Self::bad_request(err.to_string()),
            DashboardError::Auth(_) | DashboardError::Vendor(_) | DashboardError::DataFormat(_) => {
                Self::bad_gateway(err.to_string())
            }
            DashboardError::Config(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
