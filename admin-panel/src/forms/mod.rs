//! Inbound browser forms, urlencoded or multipart, and their validation.

use crate::api::UploadedFile;
use crate::error::PanelError;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::{Validate, ValidationError, ValidationErrors};

/// Fields that steer request handling and never reach a form struct.
const CONTROL_FIELDS: &[&str] = &["_method", "_token"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadedFile)>,
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = PanelError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            Self::from_urlencoded(&body)
        }
    }
}

fn bad_request(message: String) -> PanelError {
    PanelError::App(AppError::BadRequest(anyhow::anyhow!(message)))
}

impl FormData {
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            files: Vec::new(),
        }
    }

    pub fn from_urlencoded(body: &[u8]) -> Result<Self, PanelError> {
        let fields: Vec<(String, String)> =
            serde_urlencoded::from_bytes(body).map_err(|e| bad_request(e.to_string()))?;
        Ok(Self {
            fields,
            files: Vec::new(),
        })
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, PanelError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                    // An untouched file input still submits an empty part.
                    if file_name.is_empty() || bytes.is_empty() {
                        continue;
                    }
                    form.push_file(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                    form.fields.push((name, text));
                }
            }
        }
        Ok(form)
    }

    /// Last submitted value of a field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values of a list field, submitted as `name[]`.
    pub fn values(&self, name: &str) -> Vec<&str> {
        let key = format!("{}[]", name);
        self.fields
            .iter()
            .filter(|(k, v)| *k == key && !v.is_empty())
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Checkbox state: present means checked.
    pub fn checked(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == name)
    }

    /// `_method` override carried by HTML forms, upper-cased.
    pub fn method_override(&self) -> Option<String> {
        self.value("_method").map(|m| m.trim().to_ascii_uppercase())
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.push((name.into(), file));
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|(key, _)| key == name)?;
        Some(self.files.remove(index).1)
    }

    /// Deserializes the text fields into a form struct. `name[]` fields
    /// become arrays, blank values are treated as absent.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, FormError> {
        let mut object = Map::new();
        for (key, value) in &self.fields {
            if CONTROL_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if let Some(list) = key.strip_suffix("[]") {
                let entry = object
                    .entry(list.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = entry {
                    if !value.is_empty() {
                        items.push(Value::String(value.clone()));
                    }
                }
            } else if value.trim().is_empty() {
                object.remove(key);
            } else {
                object.insert(key.clone(), Value::String(value.clone()));
            }
        }
        serde_json::from_value(Value::Object(object)).map_err(FormError::Malformed)
    }

    /// Deserialize and validate in one step.
    pub fn parse<T: DeserializeOwned + Validate>(&self) -> Result<T, FormError> {
        let form: T = self.deserialize()?;
        form.validate()?;
        Ok(form)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("validation failed")]
    Invalid(#[from] ValidationErrors),
    #[error("malformed form: {0}")]
    Malformed(serde_json::Error),
}

impl FormError {
    /// Human-readable messages, ordered by field name.
    pub fn messages(&self) -> Vec<String> {
        match self {
            FormError::Invalid(errors) => {
                let mut fields: Vec<(String, Vec<String>)> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        let field = field.to_string();
                        let messages = errs
                            .iter()
                            .map(|e| match &e.message {
                                Some(message) => message.to_string(),
                                None => format!("The {} field is invalid.", field.replace('_', " ")),
                            })
                            .collect();
                        (field, messages)
                    })
                    .collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));
                fields.into_iter().flat_map(|(_, messages)| messages).collect()
            }
            FormError::Malformed(e) => vec![format!("The form could not be read: {}", e)],
        }
    }

    /// Single-field error raised outside derive validation.
    pub fn field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        FormError::Invalid(errors)
    }
}

/// `YYYY-MM-DD`, as sent by date inputs.
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            let mut error = ValidationError::new("date");
            error.message = Some("Please enter a valid date.".into());
            error
        })
}

/// Numeric id from a select box, forwarded as a JSON number when possible.
pub fn id_value(raw: &str) -> Value {
    raw.trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}
