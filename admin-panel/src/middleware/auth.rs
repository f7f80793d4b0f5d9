use crate::error::PanelError;
use crate::models::Notice;
use crate::services::session_store;
use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Lets a request through only for a signed-in browser session; everyone
/// else is sent to the login page with a notice.
pub async fn require_login(
    store: Session,
    request: Request<Body>,
    next: Next,
) -> Result<Response, PanelError> {
    let session = session_store::load(&store).await?;

    if !session.is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected to login");
        session_store::flash(&store, &Notice::authentication_required()).await?;
        return Ok(Redirect::to("/login").into_response());
    }

    Ok(next.run(request).await)
}
