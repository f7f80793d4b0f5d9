//! Presentation table for known upstream failure messages.
//!
//! The upstream API reports failures as free-text messages. Some of them get
//! a friendlier title/detail pair in the UI; the mapping lives here as data
//! and can be extended from configuration.

use crate::api::envelope::ApiEnvelope;
use crate::models::notice::Notice;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageEntry {
    pub upstream: String,
    pub title: String,
    pub detail: String,
}

/// Fallback title and detail for one context.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContextDefaults {
    title: String,
    detail: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageCatalogSettings {
    pub login: Vec<MessageEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageContext {
    Login,
}

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<(MessageContext, String), (String, String)>,
    defaults: HashMap<MessageContext, ContextDefaults>,
}

const LOGIN_MESSAGES: &[(&str, &str, &str)] = &[
    (
        "User does not exist or is not active",
        "Email Not Found",
        "The email you entered is not registered in our system.",
    ),
    (
        "Invalid credentials",
        "Wrong Password",
        "The password you entered is incorrect. Please try again.",
    ),
];

impl Default for MessageCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            entries: HashMap::new(),
            defaults: HashMap::new(),
        };
        catalog.defaults.insert(
            MessageContext::Login,
            ContextDefaults {
                title: "Login Failed".to_string(),
                detail: "An error occurred while trying to log in. Please try again.".to_string(),
            },
        );
        for (upstream, title, detail) in LOGIN_MESSAGES {
            catalog.add(MessageContext::Login, upstream, title, detail);
        }
        catalog
    }
}

impl MessageCatalog {
    /// Built-in entries overlaid with the configured ones. A configured entry
    /// with the same upstream text replaces the built-in one.
    pub fn from_settings(settings: &MessageCatalogSettings) -> Self {
        let mut catalog = Self::default();
        for entry in &settings.login {
            catalog.add(
                MessageContext::Login,
                &entry.upstream,
                &entry.title,
                &entry.detail,
            );
        }
        catalog
    }

    pub fn add(&mut self, context: MessageContext, upstream: &str, title: &str, detail: &str) {
        self.entries.insert(
            (context, upstream.to_string()),
            (title.to_string(), detail.to_string()),
        );
    }

    /// `(title, detail)` for a failure message. Unknown messages keep their
    /// text under the context's generic title; a missing message gets the
    /// generic detail too.
    pub fn lookup(&self, context: MessageContext, message: Option<&str>) -> (String, String) {
        let fallback = self.defaults.get(&context);
        let generic_title = fallback.map(|d| d.title.clone()).unwrap_or_else(|| "Error".to_string());

        match message {
            Some(message) => match self.entries.get(&(context, message.to_string())) {
                Some((title, detail)) => (title.clone(), detail.clone()),
                None => (generic_title, message.to_string()),
            },
            None => (
                generic_title,
                fallback
                    .map(|d| d.detail.clone())
                    .unwrap_or_else(|| "An unexpected error occurred.".to_string()),
            ),
        }
    }

    pub fn notice(&self, context: MessageContext, envelope: &ApiEnvelope) -> Notice {
        let (title, detail) = self.lookup(context, envelope.message.as_deref());
        Notice::error(title, detail).with_errors(envelope.error_messages())
    }
}
