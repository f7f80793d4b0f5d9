use axum::response::{IntoResponse, Redirect, Response};
use service_core::error::AppError;
use thiserror::Error;

/// Failures a page handler can end with. The redirect variants assume the
/// notice to show has already been flashed into the session.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("authentication lost")]
    AuthLost,

    #[error("access denied, redirecting to {redirect_to}")]
    AccessDenied { redirect_to: String },

    #[error("redirect to {0}")]
    Redirect(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<tower_sessions::session::Error> for PanelError {
    fn from(err: tower_sessions::session::Error) -> Self {
        PanelError::App(AppError::SessionError(err.to_string()))
    }
}

impl From<askama::Error> for PanelError {
    fn from(err: askama::Error) -> Self {
        PanelError::App(AppError::TemplateError(err.to_string()))
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        match self {
            PanelError::AuthLost => Redirect::to("/login").into_response(),
            PanelError::AccessDenied { redirect_to } | PanelError::Redirect(redirect_to) => {
                Redirect::to(&redirect_to).into_response()
            }
            PanelError::App(err) => err.into_response(),
        }
    }
}

pub type PanelResult<T> = Result<T, PanelError>;
