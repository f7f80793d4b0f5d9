use super::{Column, FieldDef, FormMode, InputKind, Resource};
use crate::api::OutboundPayload;
use crate::forms::{FormData, FormError};
use serde::Deserialize;
use validator::Validate;

pub struct Positions;

#[derive(Debug, Deserialize, Validate)]
pub struct PositionForm {
    #[validate(
        required(message = "The position code field is required."),
        length(max = 10, message = "The position code may not be greater than 10 characters.")
    )]
    pub pos_code: Option<String>,
    #[validate(
        required(message = "The position name field is required."),
        length(max = 100, message = "The position name may not be greater than 100 characters.")
    )]
    pub pos_name: Option<String>,
}

const COLUMNS: &[Column] = &[
    Column::text("ID", "pos_id"),
    Column::text("Code", "pos_code"),
    Column::text("Name", "pos_name"),
    Column::status("Status", "pos_is_active"),
];

const DETAILS: &[Column] = &[
    Column::text("ID", "pos_id"),
    Column::text("Code", "pos_code"),
    Column::text("Name", "pos_name"),
    Column::status("Status", "pos_is_active"),
    Column::badges("Users", "users", "u_name"),
];

const FIELDS: &[FieldDef] = &[
    FieldDef::new("pos_code", "Position Code", InputKind::Text).required(),
    FieldDef::new("pos_name", "Position Name", InputKind::Text).required(),
    FieldDef::new("pos_is_active", "Active", InputKind::Checkbox).checked_by_default(),
];

impl Resource for Positions {
    const SLUG: &'static str = "positions";
    const SINGULAR: &'static str = "Position";
    const PLURAL: &'static str = "Positions";
    const ID_FIELD: &'static str = "pos_id";
    const TITLE_FIELD: &'static str = "pos_name";
    const DEFAULT_SORT: &'static str = "pos_id";

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
        let parsed: PositionForm = form.parse()?;
        Ok(OutboundPayload::new()
            .with_opt("pos_code", parsed.pos_code)
            .with_opt("pos_name", parsed.pos_name)
            .with("pos_is_active", form.checked("pos_is_active")))
    }
}
