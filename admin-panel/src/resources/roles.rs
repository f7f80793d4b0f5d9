use super::{Column, FieldDef, FormMode, InputKind, Resource};
use crate::api::OutboundPayload;
use crate::forms::{FormData, FormError};
use serde::Deserialize;
use validator::Validate;

pub struct Roles;

#[derive(Debug, Deserialize, Validate)]
pub struct RoleForm {
    #[validate(
        required(message = "The role name field is required."),
        length(max = 50, message = "The role name may not be greater than 50 characters.")
    )]
    pub role_name: Option<String>,
    #[validate(
        required(message = "The role level field is required."),
        custom(function = "validate_role_level")
    )]
    pub role_level: Option<String>,
}

fn validate_role_level(value: &str) -> Result<(), validator::ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(level) if (1..=100_000).contains(&level) => Ok(()),
        _ => {
            let mut error = validator::ValidationError::new("role_level");
            error.message = Some("The role level must be an integer between 1 and 100000.".into());
            Err(error)
        }
    }
}

const COLUMNS: &[Column] = &[
    Column::text("ID", "role_id"),
    Column::text("Name", "role_name"),
    Column::text("Level", "role_level"),
    Column::status("Status", "role_is_active"),
];

const DETAILS: &[Column] = &[
    Column::text("ID", "role_id"),
    Column::text("Name", "role_name"),
    Column::text("Level", "role_level"),
    Column::status("Status", "role_is_active"),
    Column::badges("Users", "users", "u_name"),
    Column::text("Created", "role_created_at"),
    Column::text("Updated", "role_updated_at"),
];

const FIELDS: &[FieldDef] = &[
    FieldDef::new("role_name", "Role Name", InputKind::Text).required(),
    FieldDef::new("role_level", "Role Level", InputKind::Number).required(),
    FieldDef::new("role_is_active", "Active", InputKind::Checkbox).checked_by_default(),
];

impl Resource for Roles {
    const SLUG: &'static str = "roles";
    const SINGULAR: &'static str = "Role";
    const PLURAL: &'static str = "Roles";
    const ID_FIELD: &'static str = "role_id";
    const TITLE_FIELD: &'static str = "role_name";
    const DEFAULT_SORT: &'static str = "role_id";

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn details() -> &'static [Column] {
        DETAILS
    }

    fn fields() -> &'static [FieldDef] {
        FIELDS
    }

    fn payload(form: FormData, _mode: FormMode) -> Result<OutboundPayload, FormError> {
        let parsed: RoleForm = form.parse()?;
        let level = parsed
            .role_level
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok());

        Ok(OutboundPayload::new()
            .with_opt("role_name", parsed.role_name)
            .with_opt("role_level", level)
            .with("role_is_active", form.checked("role_is_active")))
    }
}
