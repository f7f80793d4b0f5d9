//! Presentation helpers shared by the templates.

use crate::models::notice::Notice;
use crate::models::session::Session;
use serde_json::Value;

pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub key: &'static str,
}

pub const NAVIGATION: &[NavItem] = &[
    NavItem { href: "/dashboard", label: "Dashboard", key: "dashboard" },
    NavItem { href: "/users", label: "Users", key: "users" },
    NavItem { href: "/roles", label: "Roles", key: "roles" },
    NavItem { href: "/divisions", label: "Divisions", key: "divisions" },
    NavItem { href: "/positions", label: "Positions", key: "positions" },
    NavItem { href: "/profile", label: "Profile", key: "profile" },
];

/// Layout data every signed-in page needs.
pub struct Chrome {
    pub user_name: String,
    pub is_super_admin: bool,
    pub active: &'static str,
    pub notice: Option<Notice>,
    pub nav: &'static [NavItem],
}

impl Chrome {
    pub fn new(session: &Session, active: &'static str, notice: Option<Notice>) -> Self {
        Self {
            user_name: session.display_name(),
            is_super_admin: crate::api::is_super_admin(session),
            active,
            notice,
            nav: NAVIGATION,
        }
    }
}

/// Rendered content of one table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Status(bool),
    Badges(Vec<String>),
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Cell::Text(text) => text,
            _ => "",
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Cell::Status(_))
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Cell::Status(true))
    }

    pub fn badges(&self) -> &[String] {
        match self {
            Cell::Badges(badges) => badges,
            _ => &[],
        }
    }

    pub fn is_badges(&self) -> bool {
        matches!(self, Cell::Badges(_))
    }
}

/// Follows a dotted path such as `division.div_name` into a record.
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |value, key| value.get(key))
        .filter(|value| !value.is_null())
}

/// Scalar as display text; missing, null and empty values show as `-`.
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "Yes" } else { "No" }.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Upstream booleans arrive as `true`, `1` or `"1"`.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

/// Text form of a scalar for input values and comparisons.
pub fn raw(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Names taken from a list of records, e.g. the `role_name` of each role.
pub fn names(value: Option<&Value>, field: &str) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other.get(field).and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn sort_arrow(column: &str, sort_by: &str, sort_order: &str) -> &'static str {
    if column != sort_by {
        ""
    } else if sort_order == "desc" {
        "↓"
    } else {
        "↑"
    }
}

/// Order the column header link should request: clicking the active column
/// flips its direction, any other column starts ascending.
pub fn next_order(column: &str, sort_by: &str, sort_order: &str) -> &'static str {
    if column == sort_by && sort_order != "desc" {
        "desc"
    } else {
        "asc"
    }
}
