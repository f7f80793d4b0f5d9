mod common;

use axum::http::StatusCode;
use axum::Router;
use common::*;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Signs in through the login form and returns the session cookie.
async fn sign_in(app: &Router, server: &MockServer, roles: serde_json::Value) -> String {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_success("tok-1", "Budi", roles)))
        .mount(server)
        .await;

    let response = post_form(app, "/login", "email=budi%40example.com&password=secret", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
    session_cookie(&response).expect("login sets the session cookie")
}

fn statistics() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "data": {
            "total_users": 42,
            "active_users": 40,
            "total_divisions": 5,
            "total_positions": 9,
            "total_roles": 3,
            "users_by_division": [{"name": "Engineering", "count": 17}],
            "users_by_position": [],
            "recent_users": [{"u_id": 41}, {"u_id": 42}]
        }
    }))
}

#[tokio::test]
async fn health_check_works() {
    let server = MockServer::start().await;
    let app = app(&server.uri());

    let response = get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn root_redirects_to_login() {
    let server = MockServer::start().await;
    let app = app(&server.uri());

    let response = get(&app, "/", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn login_page_greets_new_visitors() {
    let server = MockServer::start().await;
    let app = app(&server.uri());

    let response = get(&app, "/login", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Welcome"));
    assert!(body.contains("action=\"/login\""));
}

#[tokio::test]
async fn protected_pages_require_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let response = get(&app, "/users", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let cookie = session_cookie(&response).expect("notice is stored in a session");

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(body.contains("Authentication Required"));
    assert!(body.contains("Please login to access this page."));
}

#[tokio::test]
async fn login_then_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"email": "budi@example.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(login_success("tok-1", "Budi", json!(["staff"]))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboard/statistics"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(statistics())
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let response = post_form(&app, "/login", "email=Budi%40Example.COM&password=secret", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
    let cookie = session_cookie(&response).expect("session cookie");

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Login Successful"));
    assert!(body.contains("Welcome back, Budi!"));
    assert!(body.contains("42"));
    assert!(body.contains("Engineering"));
}

#[tokio::test]
async fn wrong_password_is_explained() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let response = post_form(&app, "/login", "email=budi%40example.com&password=nope", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    let cookie = session_cookie(&response).expect("session cookie");

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(body.contains("Wrong Password"));

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn incomplete_login_form_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri());

    let response = post_form(&app, "/login", "email=not-an-email&password=", None).await;
    assert_eq!(location(&response), Some("/login"));
    let cookie = session_cookie(&response).expect("session cookie");

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(body.contains("Login Failed"));
    assert!(body.contains("The email must be a valid email address."));
}

#[tokio::test]
async fn staff_cannot_create_roles() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "data": [{"role_id": 1, "role_name": "editor", "role_level": 10, "role_is_active": true}],
                "current_page": 1,
                "last_page": 1,
                "per_page": 10,
                "total": 1
            }
        })))
        .mount(&server)
        .await;
    let app = app(&server.uri());
    let cookie = sign_in(&app, &server, json!(["staff"])).await;

    let response = post_form(&app, "/roles", "role_name=auditor&role_level=20", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/roles"));

    let response = get(&app, "/roles", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Access Denied"));
    assert!(body.contains("editor"));
}

#[tokio::test]
async fn expired_token_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/statistics"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri());
    let cookie = sign_in(&app, &server, json!(["superadmin"])).await;

    let response = get(&app, "/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let body = body_text(get(&app, "/login", Some(&cookie)).await).await;
    assert!(body.contains("Session Expired"));

    let response = get(&app, "/users", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn user_update_with_image_is_forwarded_as_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/5"))
        .and(body_string_contains("name=\"_method\""))
        .and(body_string_contains("filename=\"avatar.png\""))
        .and(body_string_contains("name=\"roles[]\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "User updated successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server.uri());
    let cookie = sign_in(&app, &server, json!([{"role_name": "superadmin", "role_level": 1}])).await;

    let boundary = "panel-test-boundary";
    let body = multipart_body(
        boundary,
        &[
            ("_method", "PUT"),
            ("u_employee_id", "EMP-005"),
            ("u_name", "Sari"),
            ("u_email", "sari@example.com"),
            ("u_join_date", "2023-04-01"),
            ("u_is_active", "1"),
            ("roles[]", "2"),
        ],
        ("u_profile_image", "avatar.png", b"not-really-a-png"),
    );
    let response = post_multipart(&app, "/users/5", boundary, body, Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/users"));
}

#[tokio::test]
async fn invalid_user_form_returns_to_edit_page() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = app(&server.uri());
    let cookie = sign_in(&app, &server, json!(["superadmin"])).await;

    let response = post_form(
        &app,
        "/users/5",
        "_method=PUT&u_employee_id=EMP-005&u_name=Sari&u_email=broken&u_join_date=2023-04-01",
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/users/5/edit"));
}
