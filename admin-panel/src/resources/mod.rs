//! Managed records (users, roles, divisions, positions).
//!
//! Each resource describes its table columns, detail rows and form fields
//! as data, and turns a submitted form into an upstream payload. The
//! generic handlers in `handlers::resource` do the rest.

pub mod divisions;
pub mod positions;
pub mod roles;
pub mod users;

use crate::api::OutboundPayload;
use crate::context::Panel;
use crate::error::PanelResult;
use crate::forms::{FormData, FormError};
use crate::views::{self, Cell};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

pub use divisions::Divisions;
pub use positions::Positions;
pub use roles::Roles;
pub use users::Users;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    /// Active/inactive pill.
    Status,
    /// List of records, shown by the given name field.
    Badges(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub label: &'static str,
    /// Dotted path into the record.
    pub key: &'static str,
    pub sortable: bool,
    pub kind: CellKind,
}

impl Column {
    pub const fn text(label: &'static str, key: &'static str) -> Self {
        Self { label, key, sortable: true, kind: CellKind::Text }
    }

    pub const fn nested(label: &'static str, key: &'static str) -> Self {
        Self { label, key, sortable: false, kind: CellKind::Text }
    }

    pub const fn status(label: &'static str, key: &'static str) -> Self {
        Self { label, key, sortable: true, kind: CellKind::Status }
    }

    pub const fn badges(label: &'static str, key: &'static str, name: &'static str) -> Self {
        Self { label, key, sortable: false, kind: CellKind::Badges(name) }
    }

    pub fn render(&self, record: &Value) -> Cell {
        let value = views::lookup(record, self.key);
        match self.kind {
            CellKind::Text => Cell::Text(views::display(value)),
            CellKind::Status => Cell::Status(views::truthy(value)),
            CellKind::Badges(name) => Cell::Badges(views::names(value, name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    Textarea,
    Checkbox,
    /// Single choice from the named option set.
    Select(&'static str),
    /// Several choices from the named option set. Selected values are read
    /// from the record's list under the field name, by the given id key.
    MultiSelect(&'static str, &'static str),
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Required,
    OnCreate,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: InputKind,
    pub requirement: Requirement,
    /// Checkbox state on a create form.
    pub checked_on_create: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, label: &'static str, kind: InputKind) -> Self {
        Self { name, label, kind, requirement: Requirement::Optional, checked_on_create: false }
    }

    pub const fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    pub const fn on_create(mut self) -> Self {
        self.requirement = Requirement::OnCreate;
        self
    }

    pub const fn checked_by_default(mut self) -> Self {
        self.checked_on_create = true;
        self
    }
}

/// Option sets for select inputs, keyed by name: `(value, label)` pairs.
pub type OptionSets = HashMap<&'static str, Vec<(String, String)>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A form input ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: &'static str,
    /// `input`, `textarea`, `checkbox`, `select` or `file`.
    pub widget: &'static str,
    /// HTML `type` for `input` widgets.
    pub input_type: &'static str,
    pub required: bool,
    pub multiple: bool,
    pub value: String,
    pub checked: bool,
    pub options: Vec<SelectOption>,
}

/// Builds the inputs for a create form (`record` is `None`) or an edit form.
pub fn prefill(
    defs: &[FieldDef],
    record: Option<&Value>,
    options: &OptionSets,
    mode: FormMode,
) -> Vec<FormField> {
    defs.iter()
        .map(|def| {
            let value = record.and_then(|r| views::lookup(r, def.name));
            let required = match def.requirement {
                Requirement::Required => true,
                Requirement::OnCreate => mode == FormMode::Create,
                Requirement::Optional => false,
            };
            let mut field = FormField {
                name: def.name.to_string(),
                label: def.label,
                widget: "input",
                input_type: "text",
                required,
                multiple: false,
                value: String::new(),
                checked: false,
                options: Vec::new(),
            };

            match def.kind {
                InputKind::Text => field.value = views::raw(value),
                InputKind::Email => {
                    field.input_type = "email";
                    field.value = views::raw(value);
                }
                InputKind::Number => {
                    field.input_type = "number";
                    field.value = views::raw(value);
                }
                InputKind::Password => field.input_type = "password",
                InputKind::Date => {
                    field.input_type = "date";
                    field.value = views::raw(value).chars().take(10).collect();
                }
                InputKind::Textarea => {
                    field.widget = "textarea";
                    field.value = views::raw(value);
                }
                InputKind::Checkbox => {
                    field.widget = "checkbox";
                    field.checked = match record {
                        Some(_) => views::truthy(value),
                        None => def.checked_on_create,
                    };
                }
                InputKind::Select(source) => {
                    field.widget = "select";
                    let current = views::raw(value);
                    field.options = select_options(options, source, |v| *v == current);
                }
                InputKind::MultiSelect(source, id_key) => {
                    field.widget = "select";
                    field.multiple = true;
                    field.name = format!("{}[]", def.name);
                    let chosen: Vec<String> = value
                        .and_then(Value::as_array)
                        .map(|items| {
                            items
                                .iter()
                                .map(|item| match item.get(id_key) {
                                    Some(id) => views::raw(Some(id)),
                                    None => views::raw(Some(item)),
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    field.options = select_options(options, source, |v| chosen.contains(v));
                }
                InputKind::File => {
                    field.widget = "file";
                    field.input_type = "file";
                }
            }
            field
        })
        .collect()
}

fn select_options(
    options: &OptionSets,
    source: &str,
    is_selected: impl Fn(&String) -> bool,
) -> Vec<SelectOption> {
    options
        .get(source)
        .map(|set| {
            set.iter()
                .map(|(value, label)| SelectOption {
                    selected: is_selected(value),
                    value: value.clone(),
                    label: label.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `(id, name)` pairs from an upstream listing, bare or paginated.
pub fn option_pairs(data: Option<&Value>, id_key: &str, label_key: &str) -> Vec<(String, String)> {
    crate::models::Page::from_data(data, 0)
        .items
        .iter()
        .filter_map(|item| {
            let id = views::raw(item.get(id_key));
            let label = views::raw(item.get(label_key));
            (!id.is_empty()).then_some((id, label))
        })
        .collect()
}

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Path segment, shared by the panel routes and the upstream endpoint.
    const SLUG: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    const ID_FIELD: &'static str;
    const TITLE_FIELD: &'static str;
    const DEFAULT_SORT: &'static str;
    /// Stored file path shown as an image on the detail page.
    const IMAGE_FIELD: Option<&'static str> = None;

    fn columns() -> &'static [Column];

    fn details() -> &'static [Column];

    fn fields() -> &'static [FieldDef];

    /// Option sets the form's select inputs draw from.
    async fn options(_panel: &mut Panel, _record: Option<&Value>) -> PanelResult<OptionSets> {
        Ok(OptionSets::new())
    }

    /// Validates the submitted form and builds the upstream body.
    fn payload(form: FormData, mode: FormMode) -> Result<OutboundPayload, FormError>;

    fn index_path() -> String {
        format!("/{}", Self::SLUG)
    }

    fn record_path(id: &str) -> String {
        format!("/{}/{}", Self::SLUG, id)
    }

    fn sortable(column: &str) -> bool {
        Self::columns().iter().any(|c| c.sortable && c.key == column)
    }
}
