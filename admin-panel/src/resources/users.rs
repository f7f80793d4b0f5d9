use super::{option_pairs, Column, FieldDef, FormMode, InputKind, OptionSets, Resource};
use crate::api::OutboundPayload;
use crate::context::Panel;
use crate::error::PanelResult;
use crate::forms::{id_value, validate_date, FormData, FormError};
use crate::models::Page;
use crate::views;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

pub struct Users;

#[derive(Debug, Deserialize, Validate)]
pub struct UserForm {
    #[validate(
        required(message = "The employee ID field is required."),
        length(max = 20, message = "The employee ID may not be greater than 20 characters.")
    )]
    pub u_employee_id: Option<String>,
    #[validate(
        required(message = "The name field is required."),
        length(max = 100, message = "The name may not be greater than 100 characters.")
    )]
    pub u_name: Option<String>,
    #[validate(
        required(message = "The email field is required."),
        email(message = "The email must be a valid email address."),
        length(max = 100, message = "The email may not be greater than 100 characters.")
    )]
    pub u_email: Option<String>,
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub u_password: Option<String>,
    pub u_password_confirmation: Option<String>,
    #[validate(length(max = 20, message = "The phone may not be greater than 20 characters."))]
    pub u_phone: Option<String>,
    pub u_address: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub u_birthdate: Option<String>,
    #[validate(
        required(message = "The join date field is required."),
        custom(function = "validate_date")
    )]
    pub u_join_date: Option<String>,
    pub u_division_id: Option<String>,
    pub u_position_id: Option<String>,
    pub u_manager_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

const COLUMNS: &[Column] = &[
    Column::text("ID", "u_id"),
    Column::text("Employee ID", "u_employee_id"),
    Column::text("Name", "u_name"),
    Column::text("Email", "u_email"),
    Column::nested("Division", "division.div_name"),
    Column::nested("Position", "position.pos_name"),
    Column::badges("Roles", "roles", "role_name"),
    Column::status("Status", "u_is_active"),
];

const DETAILS: &[Column] = &[
    Column::text("Employee ID", "u_employee_id"),
    Column::text("Name", "u_name"),
    Column::text("Email", "u_email"),
    Column::text("Phone", "u_phone"),
    Column::text("Address", "u_address"),
    Column::text("Birthdate", "u_birthdate"),
    Column::text("Join Date", "u_join_date"),
    Column::nested("Division", "division.div_name"),
    Column::nested("Position", "position.pos_name"),
    Column::nested("Manager", "manager.u_name"),
    Column::status("Manager Role", "u_is_manager"),
    Column::badges("Roles", "roles", "role_name"),
    Column::status("Status", "u_is_active"),
];

const FIELDS: &[FieldDef] = &[
    FieldDef::new("u_employee_id", "Employee ID", InputKind::Text).required(),
    FieldDef::new("u_name", "Name", InputKind::Text).required(),
    FieldDef::new("u_email", "Email", InputKind::Email).required(),
    FieldDef::new("u_password", "Password", InputKind::Password).on_create(),
    FieldDef::new("u_password_confirmation", "Confirm Password", InputKind::Password).on_create(),
    FieldDef::new("u_phone", "Phone", InputKind::Text),
    FieldDef::new("u_address", "Address", InputKind::Textarea),
    FieldDef::new("u_birthdate", "Birthdate", InputKind::Date),
    FieldDef::new("u_join_date", "Join Date", InputKind::Date).required(),
    FieldDef::new("u_division_id", "Division", InputKind::Select("divisions")),
    FieldDef::new("u_position_id", "Position", InputKind::Select("positions")),
    FieldDef::new("u_manager_id", "Manager", InputKind::Select("managers")),
    FieldDef::new("roles", "Roles", InputKind::MultiSelect("roles", "role_id")),
    FieldDef::new("u_is_manager", "Is Manager", InputKind::Checkbox),
    FieldDef::new("u_is_active", "Active", InputKind::Checkbox).checked_by_default(),
    FieldDef::new("u_profile_image", "Profile Image", InputKind::File),
];

/// Listing size used when filling select boxes.
const OPTION_PAGE_SIZE: u64 = 1000;

#[async_trait]
impl Resource for Users {
    const SLUG: &'static str = "users";
    const SINGULAR: &'static str = "User";
    const PLURAL: &'static str = "Users";
    const ID_FIELD: &'static str = "u_id";
    const TITLE_FIELD: &'static str = "u_name";
    const DEFAULT_SORT: &'static str = "u_id";
    const IMAGE_FIELD: Option<&'static str> = Some("u_profile_image");

    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn details() -> &'static [Column] {
        DETAILS
    }

    fn fields() -> &'static [FieldDef] {
        FIELDS
    }

    async fn options(panel: &mut Panel, record: Option<&Value>) -> PanelResult<OptionSets> {
        let listing = || OutboundPayload::new().with("per_page", OPTION_PAGE_SIZE);
        let mut sets = OptionSets::new();

        let divisions = panel.get("/divisions", listing()).await?;
        sets.insert(
            "divisions",
            active_pairs(divisions.data(), "div_id", "div_name", |item| {
                views::truthy(item.get("div_is_active"))
            }),
        );

        let positions = panel.get("/positions", listing()).await?;
        sets.insert(
            "positions",
            active_pairs(positions.data(), "pos_id", "pos_name", |item| {
                views::truthy(item.get("pos_is_active"))
            }),
        );

        let own_id = record.map(|r| views::raw(r.get("u_id")));
        let users = panel.get("/users", listing()).await?;
        sets.insert(
            "managers",
            active_pairs(users.data(), "u_id", "u_name", |item| {
                views::truthy(item.get("u_is_manager"))
                    && views::truthy(item.get("u_is_active"))
                    && own_id.as_deref() != Some(views::raw(item.get("u_id")).as_str())
            }),
        );

        let roles = panel.get("/roles", listing()).await?;
        sets.insert("roles", option_pairs(roles.data(), "role_id", "role_name"));

        for (name, set) in &sets {
            if set.is_empty() {
                tracing::debug!(options = %name, "No options available for user form");
            }
        }
        Ok(sets)
    }

    fn payload(mut form: FormData, mode: FormMode) -> Result<OutboundPayload, FormError> {
        let parsed: UserForm = form.deserialize()?;

        let mut errors = parsed.validate().err().unwrap_or_else(ValidationErrors::new);
        if mode == FormMode::Create && parsed.u_password.is_none() {
            let mut error = ValidationError::new("required");
            error.message = Some("The password field is required.".into());
            errors.add("u_password", error);
        }
        if let Err(error) = validate_password_confirmation(&parsed) {
            errors.add("u_password", error);
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let nullable = |value: Option<String>| value.map(Value::String).unwrap_or(Value::Null);
        let id = |value: Option<String>| value.as_deref().map(id_value).unwrap_or(Value::Null);

        let mut payload = OutboundPayload::new()
            .with_opt("u_employee_id", parsed.u_employee_id)
            .with_opt("u_name", parsed.u_name)
            .with_opt("u_email", parsed.u_email)
            .with_opt("u_password", parsed.u_password.clone())
            .with_opt("u_password_confirmation", parsed.u_password.and(parsed.u_password_confirmation))
            .with("u_phone", nullable(parsed.u_phone))
            .with("u_address", nullable(parsed.u_address))
            .with("u_birthdate", nullable(parsed.u_birthdate))
            .with_opt("u_join_date", parsed.u_join_date)
            .with("u_division_id", id(parsed.u_division_id))
            .with("u_position_id", id(parsed.u_position_id))
            .with("u_manager_id", id(parsed.u_manager_id))
            .with("u_is_manager", i32::from(form.checked("u_is_manager")))
            .with("u_is_active", i32::from(form.checked("u_is_active")))
            .with_list("roles", parsed.roles.iter().map(|r| id_value(r)));

        if let Some(image) = form.take_file("u_profile_image") {
            payload = payload.with_file("u_profile_image", image);
        }
        Ok(payload)
    }
}

/// A given password must be repeated exactly in the confirmation field.
fn validate_password_confirmation(form: &UserForm) -> Result<(), ValidationError> {
    match form.u_password.as_deref() {
        Some(password) if form.u_password_confirmation.as_deref() != Some(password) => {
            let mut error = ValidationError::new("confirmed");
            error.message = Some("The password confirmation does not match.".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

fn active_pairs(
    data: Option<&Value>,
    id_key: &str,
    label_key: &str,
    keep: impl Fn(&Value) -> bool,
) -> Vec<(String, String)> {
    Page::from_data(data, 0)
        .items
        .iter()
        .filter(|item| keep(item))
        .filter_map(|item| {
            let id = views::raw(item.get(id_key));
            (!id.is_empty()).then(|| (id, views::raw(item.get(label_key))))
        })
        .collect()
}
