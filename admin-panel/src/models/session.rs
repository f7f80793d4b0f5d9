use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role as delivered by the upstream API. Older API versions send bare
/// names, newer ones send role records; both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RoleEntry {
    Name(String),
    Detailed {
        #[serde(alias = "roleName")]
        role_name: String,
        #[serde(default, alias = "roleLevel", deserialize_with = "lenient_level")]
        role_level: Option<i64>,
    },
}

/// Normalized role kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub level: Option<i64>,
}

impl From<RoleEntry> for Role {
    fn from(entry: RoleEntry) -> Self {
        match entry {
            RoleEntry::Name(name) => Role { name, level: None },
            RoleEntry::Detailed {
                role_name,
                role_level,
            } => Role {
                name: role_name,
                level: role_level,
            },
        }
    }
}

impl Role {
    /// Parses a raw `roles` value from a login or `/me` response. Entries of
    /// any other shape are dropped.
    pub fn parse_list(raw: Option<&Value>) -> Vec<Role> {
        let Some(Value::Array(items)) = raw else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value::<RoleEntry>(item.clone()).ok())
            .map(Role::from)
            .collect()
    }
}

/// Authentication state of one browser session.
///
/// Only a session with both a token and a user counts as signed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub auth_token: Option<String>,
    pub user: Option<Value>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Session {
    pub fn signed_in(token: impl Into<String>, user: Value, roles: Vec<Role>) -> Self {
        Self {
            auth_token: Some(token.into()),
            user: Some(user),
            roles,
        }
    }

    /// Builds a session from the `data` of a successful `/login` envelope:
    /// `{token, user, roles?}`. Returns `None` when token or user is missing.
    pub fn from_login_data(data: &Value) -> Option<Self> {
        let token = data.get("token")?.as_str()?.to_string();
        let user = data.get("user").filter(|u| !u.is_null())?.clone();
        let roles = Role::parse_list(data.get("roles"));
        Some(Self::signed_in(token, user, roles))
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.as_deref().is_some_and(|t| !t.is_empty()) && self.user.is_some()
    }

    /// Token to send upstream; empty when signed out.
    pub fn bearer(&self) -> &str {
        self.auth_token.as_deref().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.auth_token = None;
        self.user = None;
        self.roles.clear();
    }

    pub fn user_field(&self, field: &str) -> Option<&str> {
        self.user.as_ref()?.get(field)?.as_str()
    }

    pub fn display_name(&self) -> String {
        self.user_field("u_name")
            .or_else(|| self.user_field("u_email"))
            .unwrap_or("User")
            .to_string()
    }
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn both_role_shapes_normalize() {
        let roles = Role::parse_list(Some(&json!([
            "superadmin",
            {"role_name": "Manager", "role_level": 10},
            {"roleName": "Staff", "roleLevel": "3"},
            42,
            {"unexpected": true}
        ])));

        assert_eq!(
            roles,
            vec![
                Role { name: "superadmin".into(), level: None },
                Role { name: "Manager".into(), level: Some(10) },
                Role { name: "Staff".into(), level: Some(3) },
            ]
        );
    }

    #[test]
    fn partial_sessions_are_not_authenticated() {
        assert!(!Session::default().is_authenticated());

        let token_only = Session {
            auth_token: Some("t".into()),
            ..Session::default()
        };
        assert!(!token_only.is_authenticated());

        let user_only = Session {
            user: Some(json!({"u_name": "budi"})),
            ..Session::default()
        };
        assert!(!user_only.is_authenticated());

        assert!(Session::signed_in("t", json!({}), vec![]).is_authenticated());
    }

    #[test]
    fn login_data_requires_token_and_user() {
        let session = Session::from_login_data(&json!({
            "token": "abc",
            "user": {"u_name": "budi"},
            "roles": [{"role_name": "superadmin", "role_level": 1}]
        }))
        .unwrap();
        assert_eq!(session.bearer(), "abc");
        assert_eq!(session.display_name(), "budi");
        assert_eq!(session.roles.len(), 1);

        let no_roles = Session::from_login_data(&json!({"token": "abc", "user": {}})).unwrap();
        assert!(no_roles.roles.is_empty());

        assert!(Session::from_login_data(&json!({"user": {}})).is_none());
        assert!(Session::from_login_data(&json!({"token": "abc", "user": null})).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let mut session = Session::signed_in(
            "t",
            json!({"u_name": "x"}),
            vec![Role { name: "superadmin".into(), level: None }],
        );
        session.clear();
        assert_eq!(session, Session::default());
        assert_eq!(session.bearer(), "");
    }
}
