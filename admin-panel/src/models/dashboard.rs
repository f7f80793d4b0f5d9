use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub count: u64,
}

/// Figures shown on the dashboard, read from `/dashboard/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_divisions: u64,
    pub total_positions: u64,
    pub total_roles: u64,
    pub new_users_this_month: u64,
    pub users_by_division: Vec<Bucket>,
    pub users_by_position: Vec<Bucket>,
}

impl DashboardStats {
    pub fn from_data(data: &Value) -> Self {
        let count = |key: &str| data.get(key).and_then(Value::as_u64).unwrap_or(0);
        Self {
            total_users: count("total_users"),
            active_users: count("active_users"),
            total_divisions: count("total_divisions"),
            total_positions: count("total_positions"),
            total_roles: count("total_roles"),
            new_users_this_month: data
                .get("recent_users")
                .and_then(Value::as_array)
                .map_or(0, |users| users.len() as u64),
            users_by_division: buckets(data.get("users_by_division")),
            users_by_position: buckets(data.get("users_by_position")),
        }
    }
}

fn buckets(raw: Option<&Value>) -> Vec<Bucket> {
    raw.and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| Bucket {
                    name: item
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown")
                        .to_string(),
                    count: item.get("count").and_then(Value::as_u64).unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default()
}
