use admin_panel::api::{ApiGateway, ApiMethod, GatewayOutcome, OutboundPayload, UploadedFile};
use admin_panel::models::{Role, Session};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn gateway(server: &MockServer) -> ApiGateway {
    ApiGateway::with_client(reqwest::Client::new(), &server.uri())
}

fn staff_session() -> Session {
    Session::signed_in(
        "tok-1",
        json!({"u_id": 1, "u_name": "Budi"}),
        vec![Role { name: "staff".into(), level: Some(10) }],
    )
}

fn admin_session() -> Session {
    Session::signed_in(
        "tok-1",
        json!({"u_id": 1, "u_name": "Budi"}),
        vec![Role { name: "superadmin".into(), level: Some(1) }],
    )
}

fn avatar() -> UploadedFile {
    UploadedFile {
        file_name: "avatar.png".into(),
        content_type: "image/png".into(),
        bytes: b"not-really-a-png".to_vec(),
    }
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "ok", "data": {"id": 5}}))
}

/// Answers with the number of multipart parts received per list field.
struct PartCounter(&'static str);

impl Respond for PartCounter {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body = String::from_utf8_lossy(&request.body);
        let count = body.matches(&format!("name=\"{}[]\"", self.0)).count();
        let mut data = serde_json::Map::new();
        data.insert(self.0.to_string(), json!(count));
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
    }
}

fn envelope(outcome: GatewayOutcome) -> admin_panel::api::ApiEnvelope {
    match outcome {
        GatewayOutcome::Envelope(envelope) => envelope,
        GatewayOutcome::AuthLost => panic!("unexpected AuthLost"),
    }
}

#[tokio::test]
async fn get_sends_query_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(query_param("search", "budi"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(header("Accept", "application/json"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = staff_session();
    let query = OutboundPayload::new().with("page", 2).with("search", "budi");
    let base_url = format!("{}/", server.uri());
    let gateway = ApiGateway::with_client(reqwest::Client::new(), &base_url);
    let envelope = envelope(gateway.get(&mut session, "/users", query).await);

    assert!(envelope.success);
    assert_eq!(envelope.data(), Some(&json!({"id": 5})));
}

#[tokio::test]
async fn payload_without_files_is_sent_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/roles/3"))
        .and(body_json(json!({"role_name": "editor", "role_is_active": false})))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = admin_session();
    let payload = OutboundPayload::new()
        .with("role_name", "editor")
        .with("role_is_active", false);
    let outcome = gateway(&server)
        .request(&mut session, ApiMethod::Put, "/roles/3", payload)
        .await;

    assert!(envelope(outcome).success);
}

#[tokio::test]
async fn post_with_file_is_sent_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_string_contains("name=\"u_name\""))
        .and(body_string_contains("filename=\"avatar.png\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = admin_session();
    let payload = OutboundPayload::new()
        .with("u_name", "Budi")
        .with_list("roles", [1, 3])
        .with_file("u_profile_image", avatar());
    let outcome = gateway(&server).post(&mut session, "/users", payload).await;
    assert!(envelope(outcome).success);

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert_eq!(body.matches("name=\"roles[]\"").count(), 2);
    assert!(!body.contains("name=\"_method\""));
}

#[tokio::test]
async fn list_length_survives_multipart_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(PartCounter("roles"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = admin_session();
    let payload = OutboundPayload::new()
        .with("u_name", "Budi")
        .with_list("roles", [1, 2, 3])
        .with_file("u_profile_image", avatar());
    let envelope = envelope(gateway(&server).post(&mut session, "/users", payload).await);

    assert!(envelope.success);
    assert_eq!(envelope.data(), Some(&json!({"roles": 3})));
}

#[tokio::test]
async fn put_with_file_travels_as_post_with_method_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/5"))
        .and(body_string_contains("name=\"_method\""))
        .and(body_string_contains("PUT"))
        .and(body_string_contains("filename=\"avatar.png\""))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = admin_session();
    let payload = OutboundPayload::new()
        .with("u_name", "Budi")
        .with_file("u_profile_image", avatar());
    let outcome = gateway(&server)
        .request(&mut session, ApiMethod::Put, "/users/5", payload)
        .await;

    assert!(envelope(outcome).success);
}

#[tokio::test]
async fn unauthorized_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/statistics"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&server)
        .await;

    let mut session = staff_session();
    let outcome = gateway(&server)
        .get(&mut session, "/dashboard/statistics", OutboundPayload::new())
        .await;

    assert_eq!(outcome, GatewayOutcome::AuthLost);
    assert!(!session.is_authenticated());
    assert!(session.roles.is_empty());
}

#[tokio::test]
async fn unauthorized_login_is_an_ordinary_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Wrong password"})),
        )
        .mount(&server)
        .await;

    let mut session = Session::default();
    let payload = OutboundPayload::new()
        .with("email", "budi@example.com")
        .with("password", "nope");
    let envelope = envelope(gateway(&server).post(&mut session, "/login", payload).await);

    assert!(!envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Wrong password"));
}

#[tokio::test]
async fn non_json_body_is_reported_as_invalid_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Server Error</html>"))
        .mount(&server)
        .await;

    let mut session = staff_session();
    let envelope = envelope(
        gateway(&server)
            .get(&mut session, "/roles", OutboundPayload::new())
            .await,
    );

    assert!(!envelope.success);
    assert_eq!(
        envelope.message.as_deref(),
        Some("Invalid response format from server")
    );
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_failure() {
    let gateway = ApiGateway::with_client(reqwest::Client::new(), "http://127.0.0.1:1");
    let mut session = staff_session();
    let envelope = envelope(
        gateway
            .get(&mut session, "/roles", OutboundPayload::new())
            .await,
    );

    assert!(!envelope.success);
    let message = envelope.message.unwrap_or_default();
    assert!(message.starts_with("Cannot connect to server: "), "{}", message);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn guarded_mutation_is_refused_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ok())
        .expect(0)
        .mount(&server)
        .await;

    let mut session = staff_session();
    let denied = gateway(&server)
        .guarded_request(
            &mut session,
            ApiMethod::Delete,
            "/roles/3",
            OutboundPayload::new(),
            "/roles",
        )
        .await
        .expect_err("staff cannot delete");

    assert_eq!(denied.redirect_to, "/roles");
    assert_eq!(denied.notice.title, "Access Denied");
}

#[tokio::test]
async fn guarded_read_is_allowed_for_everyone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/roles"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut session = staff_session();
    let outcome = gateway(&server)
        .guarded_request(
            &mut session,
            ApiMethod::Get,
            "/roles",
            OutboundPayload::new(),
            "/roles",
        )
        .await
        .expect("reads are not gated");

    assert!(envelope(outcome).success);
}
