//! Outbound request bodies for the upstream API.
//!
//! A payload is an ordered set of named fields. Scalar and list fields can be
//! sent as JSON, a query string or multipart parts; a single file field forces
//! the whole payload onto multipart.

use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

/// A file received from the browser, held in memory until it is forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    List(Vec<Value>),
    File(UploadedFile),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutboundPayload {
    fields: Vec<(String, FieldValue)>,
}

impl OutboundPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping the position of an existing one.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, FieldValue::Scalar(value.into()));
        self
    }

    /// Adds the field only when a value is present.
    pub fn with_opt<V: Into<Value>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn with_list<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name, FieldValue::List(values));
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.insert(name, FieldValue::File(file));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn has_files(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, value)| matches!(value, FieldValue::File(_)))
    }

    /// Field names with a short type tag, for request logs. Values are never
    /// logged since they may contain passwords.
    pub fn shape(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(name, value)| match value {
                FieldValue::Scalar(_) => name.clone(),
                FieldValue::List(items) => format!("{}[{}]", name, items.len()),
                FieldValue::File(file) => format!("{}<file:{}>", name, file.file_name),
            })
            .collect()
    }

    /// JSON object body. File fields are skipped; callers route payloads with
    /// files through [`OutboundPayload::into_multipart`] instead.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.fields {
            match value {
                FieldValue::Scalar(v) => {
                    object.insert(name.clone(), v.clone());
                }
                FieldValue::List(items) => {
                    object.insert(name.clone(), Value::Array(items.clone()));
                }
                FieldValue::File(_) => {}
            }
        }
        Value::Object(object)
    }

    /// Query-string pairs. Lists become repeated `name[]` pairs and nulls
    /// are omitted.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.fields {
            match value {
                FieldValue::Scalar(Value::Null) => {}
                FieldValue::Scalar(v) => pairs.push((name.clone(), form_text(v))),
                FieldValue::List(items) => {
                    let key = list_key(name);
                    pairs.extend(items.iter().map(|item| (key.clone(), form_text(item))));
                }
                FieldValue::File(_) => {}
            }
        }
        pairs
    }

    /// Multipart form: one text part per scalar, one `name[]` part per list
    /// element, one file part per file. `extra` fields (such as the `_method`
    /// override) are appended after the regular fields.
    pub fn into_multipart(self, extra: &[(&str, &str)]) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        let mut files = Vec::new();

        for (name, value) in self.fields {
            match value {
                FieldValue::Scalar(v) => form = form.text(name, form_text(&v)),
                FieldValue::List(items) => {
                    let key = list_key(&name);
                    for item in items {
                        form = form.text(key.clone(), form_text(&item));
                    }
                }
                FieldValue::File(file) => files.push((name, file)),
            }
        }

        for (name, value) in extra {
            form = form.text(name.to_string(), value.to_string());
        }

        for (name, file) in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(name, part);
        }

        Ok(form)
    }
}

fn list_key(name: &str) -> String {
    if name.ends_with("[]") {
        name.to_string()
    } else {
        format!("{}[]", name)
    }
}

/// Text rendering of a JSON scalar inside form bodies.
fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
