use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::{repository::RepoError, views::Page};

/// AppError
///
/// The two user-visible failure classes. Authorization denials on mutating routes are not
/// errors: handlers answer them with a redirect.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing resource, or one the requester may not see.
    #[error("Not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Repository(#[from] RepoError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                tracing::debug!("rendering not-found page");
                Page::NotFound.into_response()
            }
            AppError::Repository(e) => {
                tracing::error!(error = %e, "request aborted by storage failure");
                Page::ServerError.into_response()
            }
        }
    }
}
