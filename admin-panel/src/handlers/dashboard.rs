use crate::api::OutboundPayload;
use crate::context::Panel;
use crate::error::PanelResult;
use crate::models::DashboardStats;
use crate::views::Chrome;
use askama::Template;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub stats: DashboardStats,
    pub error: Option<String>,
}

pub async fn dashboard_handler(mut panel: Panel) -> PanelResult<Response> {
    let envelope = panel
        .get("/dashboard/statistics", OutboundPayload::new())
        .await?;

    let (stats, error) = if envelope.success {
        let data = envelope.data.as_ref().unwrap_or(&Value::Null);
        (DashboardStats::from_data(data), None)
    } else {
        tracing::warn!(reason = ?envelope.message, "Dashboard statistics unavailable");
        (
            DashboardStats::default(),
            Some(envelope.message_or("Failed to load dashboard data").to_string()),
        )
    };

    Ok(DashboardTemplate {
        chrome: panel.chrome("dashboard").await?,
        stats,
        error,
    }
    .into_response())
}
