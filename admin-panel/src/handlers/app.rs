use axum::response::Redirect;

pub async fn index() -> Redirect {
    Redirect::to("/login")
}

pub async fn health_check() -> &'static str {
    "OK"
}
