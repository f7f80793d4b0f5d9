use super::{Column, FieldDef, FormMode, InputKind, Resource};
use crate::api::OutboundPayload;
use crate::forms::{FormData, FormError};
use serde::Deserialize;
use validator::Validate;

pub struct Divisions;

#[derive(Debug, Deserialize, Validate)]
pub struct DivisionForm {
    #[validate(
        required(message = "The division code field is required."),
        length(max = 10, message = "The division code may not be greater than 10 characters.")
    )]
    pub div_code: Option<String>,
    #[validate(
        required(message = "The division name field is required."),
        length(max = 100, message = "The division name may not be greater than 100 characters.")
    )]
    pub div_name: Option<String>,
}

const COLUMNS: &[Column] = &[
    Column::text("ID", "div_id"),
    Column::text("Code", "div_code"),
    Column::text("Name", "div_name"),
    Column::status("Status", "div_is_active"),
];

const DETAILS: &[Column] = &[
    Column::text("ID", "div_id"),
    Column::text("Code", "div_code"),
    Column::text("Name", "div_name"),
    Column::status("Status", "div_is_active"),
    Column::badges("Users", "users", "u_name"),
    Column::text("Created", "div_created_at"),
    Column::text("Updated", "div_updated_at"),
];

const FIELDS: &[FieldDef] = &[
    FieldDef::new("div_code", "Division Code", InputKind::Text).required(),
    FieldDef::new("div_name", "Division Name", InputKind::Text).required(),
    FieldDef::new("div_is_active", "Active", InputKind::Checkbox).checked_by_default(),
];

impl Resource for Divisions {
    const SLUG: &'static str = "divisions";
    const SINGULAR: &'static str = "Division";
    const PLURAL: &'static str = "Divisions";
    const ID_FIELD: &'static str = "div_id";
    const TITLE_FIELD: &'static str = "div_name";
    const DEFAULT_SORT: &'static str = "div_id";

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
        let parsed: DivisionForm = form.parse()?;
        Ok(OutboundPayload::new()
            .with_opt("div_code", parsed.div_code)
            .with_opt("div_name", parsed.div_name)
            .with("div_is_active", form.checked("div_is_active")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn division_payload() {
        let form = FormData::from_pairs([
            ("_method", "PUT"),
            ("div_code", "IT"),
            ("div_name", "Information Technology"),
            ("div_is_active", "1"),
        ]);
        assert_eq!(
            Divisions::payload(form, FormMode::Edit).unwrap().to_json(),
            json!({"div_code": "IT", "div_name": "Information Technology", "div_is_active": true})
        );
    }

    #[test]
    fn code_limit() {
        let form = FormData::from_pairs([("div_code", "ABCDEFGHIJK"), ("div_name", "x")]);
        assert_eq!(
            Divisions::payload(form, FormMode::Create).unwrap_err().messages(),
            vec!["The division code may not be greater than 10 characters."]
        );
    }
}
