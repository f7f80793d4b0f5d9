use crate::api::{ApiMethod, MessageContext, OutboundPayload, LOGIN_ENDPOINT};
use crate::context::Panel;
use crate::error::{PanelError, PanelResult};
use crate::forms::FormData;
use crate::models::{Notice, Session};
use askama::Template;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use validator::Validate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub notice: Option<Notice>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email must be a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(required(message = "The password field is required."))]
    pub password: Option<String>,
}

pub async fn login_page(panel: Panel) -> PanelResult<Response> {
    if !panel.has_notice().await? {
        panel
            .flash(Notice::info("Welcome", "Please login to access the user admin panel."))
            .await?;
    }
    let notice = panel.take_notice().await?;
    Ok(LoginTemplate { notice }.into_response())
}

pub async fn login_handler(mut panel: Panel, form: FormData) -> PanelResult<Response> {
    let credentials: LoginForm = match form.parse() {
        Ok(credentials) => credentials,
        Err(err) => {
            panel
                .flash(
                    Notice::error("Login Failed", "Please enter your email and password.")
                        .with_errors(err.messages()),
                )
                .await?;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    let email = credentials.email.unwrap_or_default().to_lowercase();
    let payload = OutboundPayload::new()
        .with("email", email.clone())
        .with("password", credentials.password.unwrap_or_default());

    let envelope = panel.call(ApiMethod::Post, LOGIN_ENDPOINT, payload).await?;
    let catalog = panel.state.catalog.clone();

    if !envelope.success {
        tracing::info!(email = %email, reason = ?envelope.message, "Login rejected");
        panel.flash(catalog.notice(MessageContext::Login, &envelope)).await?;
        return Ok(Redirect::to("/login").into_response());
    }

    let Some(session) = envelope.data().and_then(Session::from_login_data) else {
        tracing::error!(email = %email, "Login response is missing token or user");
        let (title, detail) = catalog.lookup(MessageContext::Login, None);
        panel.flash(Notice::error(title, detail)).await?;
        return Ok(Redirect::to("/login").into_response());
    };

    panel.sign_in(session).await?;
    let name = panel.session.display_name();
    tracing::info!(email = %email, roles = panel.session.roles.len(), "User logged in");
    panel
        .flash(Notice::success("Login Successful", format!("Welcome back, {}!", name)))
        .await?;

    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn logout_handler(mut panel: Panel) -> PanelResult<Response> {
    // The upstream token may already be gone; logging out locally still applies.
    match panel
        .call(ApiMethod::Post, "/auth/logout", OutboundPayload::new())
        .await
    {
        Ok(envelope) if !envelope.success => {
            tracing::warn!(reason = ?envelope.message, "Upstream logout failed");
        }
        Ok(_) | Err(PanelError::AuthLost) => {}
        Err(e) => return Err(e),
    }

    panel.sign_out().await?;
    panel
        .flash(Notice::success("Logged Out", "You have been successfully logged out."))
        .await?;

    Ok(Redirect::to("/login").into_response())
}
