use crate::application::ApplicationError;
use crate::metadata::MetadataError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StratumError>;

#[derive(Debug, Error)]
pub enum StratumError {
    #[error("Binding not found: {key}")]
    DependencyNotFound { key: String },

    #[error("Binding '{key}' does not hold a value of type {type_name}")]
    DowncastFailed { key: String, type_name: String },

    #[error("No injection declared for {target}")]
    MissingInjection { target: String },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for StratumError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            StratumError::Application(ApplicationError::ServerNotFound { .. })
            | StratumError::DependencyNotFound { .. } => axum::http::StatusCode::NOT_FOUND,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
