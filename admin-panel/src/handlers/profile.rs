use crate::api::OutboundPayload;
use crate::context::Panel;
use crate::error::PanelResult;
use crate::handlers::resource::DetailRow;
use crate::models::Role;
use crate::resources::Column;
use crate::views::{self, Chrome};
use askama::Template;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

const PROFILE_ROWS: &[Column] = &[
    Column::text("Employee ID", "u_employee_id"),
    Column::text("Email", "u_email"),
    Column::text("Phone", "u_phone"),
    Column::text("Address", "u_address"),
    Column::text("Birthdate", "u_birthdate"),
    Column::text("Join Date", "u_join_date"),
    Column::nested("Division", "division.div_name"),
    Column::nested("Position", "position.pos_name"),
    Column::badges("Roles", "roles", "role_name"),
    Column::status("Status", "u_is_active"),
];

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub chrome: Chrome,
    pub name: String,
    pub image: Option<String>,
    pub rows: Vec<DetailRow>,
}

pub async fn profile_handler(mut panel: Panel) -> PanelResult<Response> {
    let envelope = panel.get("/me", OutboundPayload::new()).await?;

    match envelope.data() {
        Some(user @ Value::Object(_)) => {
            if let Some(roles @ Value::Array(_)) = user.get("roles") {
                panel.session.roles = Role::parse_list(Some(roles));
            }
            panel.session.user = Some(user.clone());
            panel.save().await?;
        }
        _ => {
            tracing::warn!(reason = ?envelope.message, "Profile refresh failed, showing stored user");
        }
    }

    let user = panel.session.user.clone().unwrap_or(Value::Null);
    let image = views::lookup(&user, "u_profile_image")
        .map(|path| views::raw(Some(path)))
        .and_then(|path| panel.state.settings.api.storage_link(&path));

    Ok(ProfileTemplate {
        chrome: panel.chrome("profile").await?,
        name: panel.session.display_name(),
        image,
        rows: PROFILE_ROWS
            .iter()
            .map(|column| DetailRow {
                label: column.label,
                cell: column.render(&user),
            })
            .collect(),
    }
    .into_response())
}
