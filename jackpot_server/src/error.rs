use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jackpot_core::{CoreError, ErrorKind, UnknownAudioKind};
use jackpot_shared::ErrorBody;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Not found")]
    BadCombinationId(String),
    #[error("File is required")]
    MissingFile,
    #[error("Unknown type")]
    UnknownMediaType(#[from] UnknownAudioKind),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("failed to store upload: {0}")]
    Upload(#[source] std::io::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(e) => match e.kind() {
                ErrorKind::Validation | ErrorKind::Precondition => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadCombinationId(_) => StatusCode::NOT_FOUND,
            AppError::MissingFile | AppError::UnknownMediaType(_) | AppError::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Upload(_) | AppError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Invalid(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(_: MultipartRejection) -> Self {
        AppError::MissingFile
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Invalid(e.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackpot_core::StoreError;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::from(CoreError::ComboRequired).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(CoreError::DuplicateCombo).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(CoreError::ComboNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(CoreError::NoActiveCombinations).status(),
            StatusCode::BAD_REQUEST
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let store = CoreError::from(StoreError::Io {
            path: "state.json".into(),
            source: io,
        });
        assert_eq!(AppError::from(store).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
