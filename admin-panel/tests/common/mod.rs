#![allow(dead_code)]

use admin_panel::api::catalog::MessageCatalogSettings;
use admin_panel::config::{ApiSettings, ServerSettings, Settings, TelemetrySettings};
use admin_panel::startup::build_router;
use admin_panel::AppState;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub fn settings(base_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookies: false,
            session_idle_minutes: 30,
            static_dir: "static".to_string(),
        },
        api: ApiSettings {
            base_url: base_url.to_string(),
            storage_url: Some("http://files.test/storage".to_string()),
        },
        telemetry: TelemetrySettings::default(),
        messages: MessageCatalogSettings::default(),
    }
}

pub fn app(base_url: &str) -> Router {
    let state = AppState::new(settings(base_url)).expect("state builds");
    build_router(state)
}

pub fn login_success(token: &str, name: &str, roles: Value) -> Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": token,
            "user": {"u_id": 1, "u_name": name, "u_email": "budi@example.com"},
            "roles": roles
        }
    })
}

/// Session cookie (`name=value`) from a response, if one was set.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    String::from_utf8_lossy(&bytes).to_string()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    boundary: &str,
    body: Vec<u8>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        );
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Encodes text fields and one file as a multipart body.
pub fn multipart_body(boundary: &str, fields: &[(&str, &str)], file: (&str, &str, &[u8])) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    let (name, file_name, bytes) = file;
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
            boundary, name, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
