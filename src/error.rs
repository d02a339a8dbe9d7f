use axum::{
    Json,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::models::ErrorBody;

pub const MSG_ACCESS_DENIED: &str = "Доступ запрещен";
pub const MSG_MISSING_EXAM_ID: &str = "Не указан ID экзамена";
pub const MSG_EXAM_NOT_FOUND: &str = "Экзамен не найден";
pub const MSG_INTERNAL: &str = "Внутренняя ошибка сервера";

/// RepositoryError
///
/// Failure of the persistence layer. Handlers decide whether it is fatal for the
/// request or degrades to an empty result.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// ApiError
///
/// Errors of the JSON endpoints. Every variant renders as `{"error": "..."}` with the
/// matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MissingParameter(&'static str),
    #[error("access denied")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::MissingParameter(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Forbidden => MSG_ACCESS_DENIED,
            ApiError::Internal(_) => MSG_INTERNAL,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            tracing::error!("api request failed: {}", e);
        }
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (self.status(), json_utf8(), Json(body)).into_response()
    }
}

/// PageError
///
/// Errors of the HTML pages: a failed role gate redirects to the login page, anything
/// else renders a bare 500 page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("redirect to {0}")]
    Redirect(String),
    #[error(transparent)]
    Internal(#[from] RepositoryError),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Redirect(location) => Redirect::to(&location).into_response(),
            PageError::Internal(e) => {
                tracing::error!("page request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(crate::templates::render_error_page(MSG_INTERNAL)),
                )
                    .into_response()
            }
        }
    }
}

/// Content-Type header pinned to UTF-8 so clients never guess the encoding of the
/// Cyrillic messages and exam content.
pub fn json_utf8() -> [(header::HeaderName, &'static str); 1] {
    [(header::CONTENT_TYPE, "application/json; charset=utf-8")]
}
