//! The uniform `{success, data|message|errors}` shape every gateway call
//! resolves to, and the normalization from raw upstream responses into it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format from server";
pub const TRANSPORT_FAILURE_PREFIX: &str = "Cannot connect to server: ";

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_errors"
    )]
    pub errors: Option<FieldErrors>,
}

/// Why a call did not produce a successful envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayFailure {
    InvalidResponse,
    TransportFailure,
    UpstreamError,
}

impl GatewayFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayFailure::InvalidResponse => "invalid_response",
            GatewayFailure::TransportFailure => "transport_failure",
            GatewayFailure::UpstreamError => "upstream_error",
        }
    }
}

impl ApiEnvelope {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn invalid_response() -> Self {
        Self::failure(INVALID_RESPONSE_MESSAGE)
    }

    pub fn transport_failure(details: impl std::fmt::Display) -> Self {
        Self::failure(format!("{}{}", TRANSPORT_FAILURE_PREFIX, details))
    }

    /// `data` of a successful envelope. `None` for failures even when the
    /// upstream sent a body alongside `success: false`.
    pub fn data(&self) -> Option<&Value> {
        if self.success {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }

    /// Flattened field errors, in field order, for display.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|errors| errors.values())
            .flatten()
            .cloned()
            .collect()
    }
}

/// Interpret an upstream body, reporting why the call failed when it did.
/// The status code is not consulted: the upstream reports failures through
/// `success: false` and a 401 never gets this far for authenticated
/// endpoints. The failure kind is decided while parsing, never from the
/// message text.
pub fn normalize(body: &[u8]) -> (ApiEnvelope, Option<GatewayFailure>) {
    let parsed = match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value::<ApiEnvelope>(value).ok(),
        _ => None,
    };
    match parsed {
        Some(envelope) if envelope.success => (envelope, None),
        Some(envelope) => (envelope, Some(GatewayFailure::UpstreamError)),
        None => (
            ApiEnvelope::invalid_response(),
            Some(GatewayFailure::InvalidResponse),
        ),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "true" | "1"),
        _ => false,
    })
}

/// Accepts `{field: [msg, ...]}` and `{field: msg}`. Anything else is
/// treated as absent.
fn lenient_errors<'de, D>(deserializer: D) -> Result<Option<FieldErrors>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let mut errors = FieldErrors::new();
    for (field, value) in map {
        let messages = match value {
            Value::String(s) => vec![s],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => continue,
        };
        errors.insert(field, messages);
    }
    Ok(Some(errors))
}
