use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("IO_FAILED: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(code: &str) -> Self {
        Self::Validation(code.to_string())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Duplicate(_) => StatusCode::CONFLICT,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, "request failed: {self}");
            return HttpResponse::build(status).body("INTERNAL_ERROR");
        }
        HttpResponse::build(status).body(self.to_string())
    }
}
