//! Single choke point for every call to the upstream API.
//!
//! The gateway attaches the session's bearer token, picks the body encoding,
//! and turns whatever comes back (or fails to come back) into either an
//! [`ApiEnvelope`] or [`GatewayOutcome::AuthLost`]. No error escapes it.

use crate::api::envelope::{normalize, ApiEnvelope, GatewayFailure};
use crate::api::payload::OutboundPayload;
use crate::api::policy::{self, AccessDenied};
use crate::config::ApiSettings;
use crate::models::session::Session;
use reqwest::{Client, Method, StatusCode};
use service_core::error::AppError;
use service_core::observability::TracedClientExt;

pub const LOGIN_ENDPOINT: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, ApiMethod::Get)
    }
}

impl From<ApiMethod> for Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum GatewayOutcome {
    Envelope(ApiEnvelope),
    /// The upstream rejected the token. The session passed to the call has
    /// already been cleared; the caller must abandon the current page.
    AuthLost,
}

#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    request_id: Option<String>,
}

impl ApiGateway {
    pub fn new(settings: &ApiSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("admin-panel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("HTTP client: {}", e)))?;
        Ok(Self::with_client(client, &settings.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_id: None,
        }
    }

    /// Copy of the gateway that tags outbound calls with the inbound
    /// request's correlation id.
    pub fn for_request(&self, request_id: Option<String>) -> Self {
        Self {
            request_id,
            ..self.clone()
        }
    }

    pub async fn get(
        &self,
        session: &mut Session,
        endpoint: &str,
        query: OutboundPayload,
    ) -> GatewayOutcome {
        self.request(session, ApiMethod::Get, endpoint, query).await
    }

    pub async fn post(
        &self,
        session: &mut Session,
        endpoint: &str,
        payload: OutboundPayload,
    ) -> GatewayOutcome {
        self.request(session, ApiMethod::Post, endpoint, payload).await
    }

    /// Runs the superadmin check before a mutating call. A refusal means no
    /// HTTP request was made.
    pub async fn guarded_request(
        &self,
        session: &mut Session,
        method: ApiMethod,
        endpoint: &str,
        payload: OutboundPayload,
        redirect_to: &str,
    ) -> Result<GatewayOutcome, AccessDenied> {
        if method.is_mutating() {
            policy::require_super_admin(session, redirect_to)?;
        }
        Ok(self.request(session, method, endpoint, payload).await)
    }

    pub async fn request(
        &self,
        session: &mut Session,
        method: ApiMethod,
        endpoint: &str,
        payload: OutboundPayload,
    ) -> GatewayOutcome {
        let token = session.bearer().to_string();

        tracing::info!(
            method = method.as_str(),
            endpoint = %endpoint,
            fields = ?payload.shape(),
            has_token = !token.is_empty(),
            has_files = payload.has_files(),
            "API request"
        );

        let response = match self.send(method, endpoint, &token, payload).await {
            Ok(response) => response,
            Err(e) => return self.transport_failure(method, endpoint, e),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return self.transport_failure(method, endpoint, e),
        };

        tracing::info!(
            method = method.as_str(),
            endpoint = %endpoint,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "API response"
        );

        if status == StatusCode::UNAUTHORIZED && endpoint != LOGIN_ENDPOINT {
            tracing::warn!(endpoint = %endpoint, "Upstream rejected token, clearing session");
            session.clear();
            record_outcome(method, "auth_lost");
            return GatewayOutcome::AuthLost;
        }

        let (envelope, failure) = normalize(&body);
        match failure {
            None => record_outcome(method, "success"),
            Some(failure) => {
                if failure == GatewayFailure::InvalidResponse {
                    tracing::error!(
                        endpoint = %endpoint,
                        status = status.as_u16(),
                        "Invalid JSON response from upstream"
                    );
                }
                record_outcome(method, failure.as_str());
            }
        }

        GatewayOutcome::Envelope(envelope)
    }

    async fn send(
        &self,
        method: ApiMethod,
        endpoint: &str,
        token: &str,
        payload: OutboundPayload,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, endpoint);

        let request = if payload.has_files() {
            // Multipart bodies on PUT are not reliably parsed upstream, so
            // the update travels as POST with a method override field.
            let (wire_method, extra): (ApiMethod, &[(&str, &str)]) = match method {
                ApiMethod::Put => (ApiMethod::Post, &[("_method", "PUT")]),
                other => (other, &[]),
            };
            let form = payload.into_multipart(extra)?;
            self.client.traced(wire_method.into(), &url).multipart(form)
        } else if method == ApiMethod::Get {
            self.client
                .traced(Method::GET, &url)
                .query(&payload.to_query())
        } else {
            self.client.traced(method.into(), &url).json(&payload.to_json())
        };

        request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .request_id(self.request_id.clone())
            .send()
            .await
    }

    fn transport_failure(
        &self,
        method: ApiMethod,
        endpoint: &str,
        error: reqwest::Error,
    ) -> GatewayOutcome {
        tracing::error!(
            method = method.as_str(),
            endpoint = %endpoint,
            error = %error,
            "API request error"
        );
        record_outcome(method, GatewayFailure::TransportFailure.as_str());
        GatewayOutcome::Envelope(ApiEnvelope::transport_failure(error))
    }
}

fn record_outcome(method: ApiMethod, outcome: &'static str) {
    metrics::counter!(
        "upstream_requests_total",
        "method" => method.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
