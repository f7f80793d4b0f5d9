use serde_json::Value;

/// One page of a listing. The upstream returns either a bare array or a
/// paginator object `{data, current_page, last_page, total, per_page}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub current_page: u64,
    pub last_page: u64,
    pub total: u64,
    pub per_page: u64,
}

impl Page {
    pub fn empty(per_page: u64) -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            last_page: 1,
            total: 0,
            per_page,
        }
    }

    pub fn from_data(data: Option<&Value>, per_page: u64) -> Self {
        match data {
            Some(Value::Array(items)) => Self {
                total: items.len() as u64,
                items: items.clone(),
                ..Self::empty(per_page)
            },
            Some(paginator @ Value::Object(_)) => {
                let items = paginator
                    .get("data")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let number = |key: &str| paginator.get(key).and_then(as_count);
                let current_page = number("current_page").unwrap_or(1).max(1);
                Self {
                    total: number("total").unwrap_or(items.len() as u64),
                    current_page,
                    last_page: number("last_page").unwrap_or(1).max(current_page),
                    per_page: number("per_page").unwrap_or(per_page),
                    items,
                }
            }
            _ => Self::empty(per_page),
        }
    }

    pub fn previous(&self) -> Option<u64> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    pub fn next(&self) -> Option<u64> {
        (self.current_page < self.last_page).then(|| self.current_page + 1)
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
