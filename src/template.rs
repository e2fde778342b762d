//! Message template files served under `/api/messages`.
//!
//! Most files hold a list of messages, `{"messages": ["...", ...]}`. One
//! miscellaneous file instead maps keys to single strings. The shape is
//! decided once by [`MessageTemplate::detect`].

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LoadError;
use crate::validation::{validate_template, ValidationReport, VariableSet};

#[derive(Debug, Clone, PartialEq)]
pub enum MessageTemplate {
    /// List of message strings, plus any other keys the file carries.
    Messages {
        messages: Vec<String>,
        extra: Map<String, Value>,
    },
    /// Flat key to string mapping.
    KeyValue(BTreeMap<String, String>),
}

impl MessageTemplate {
    /// Recognize a template shape.
    ///
    /// Returns `None` when the value fits neither shape; run
    /// [`validate_template`] on it to find out why.
    pub fn detect(value: &Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };

        match map.get("messages") {
            Some(Value::Array(entries)) => {
                let messages = entries
                    .iter()
                    .map(|entry| entry.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;
                let mut extra = map.clone();
                extra.remove("messages");
                Some(MessageTemplate::Messages { messages, extra })
            }
            Some(_) => None,
            None if map.is_empty() => None,
            None => map
                .iter()
                .map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
                .collect::<Option<BTreeMap<_, _>>>()
                .map(MessageTemplate::KeyValue),
        }
    }

    /// Detect and validate in one step.
    pub fn check(value: &Value, variables: &VariableSet) -> Result<Self, ValidationReport> {
        match Self::detect(value) {
            Some(template) => {
                let report = template.validate(variables);
                if report.is_valid() {
                    Ok(template)
                } else {
                    Err(report)
                }
            }
            None => Err(validate_template(value, variables)),
        }
    }

    /// Key/value templates are exempt from the list rules.
    pub fn validate(&self, variables: &VariableSet) -> ValidationReport {
        match self {
            MessageTemplate::Messages { .. } => validate_template(&self.to_value(), variables),
            MessageTemplate::KeyValue(_) => ValidationReport::default(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MessageTemplate::Messages { messages, extra } => {
                let mut map = extra.clone();
                map.insert(
                    "messages".to_string(),
                    Value::Array(messages.iter().cloned().map(Value::String).collect()),
                );
                Value::Object(map)
            }
            MessageTemplate::KeyValue(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        }
    }

    pub fn messages(&self) -> Option<&[String]> {
        match self {
            MessageTemplate::Messages { messages, .. } => Some(messages),
            MessageTemplate::KeyValue(_) => None,
        }
    }

    /// Append a message. Returns false for key/value templates.
    pub fn push_message(&mut self, text: impl Into<String>) -> bool {
        match self {
            MessageTemplate::Messages { messages, .. } => {
                messages.push(text.into());
                true
            }
            MessageTemplate::KeyValue(_) => false,
        }
    }

    pub fn set_message(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self {
            MessageTemplate::Messages { messages, .. } => match messages.get_mut(index) {
                Some(slot) => {
                    *slot = text.into();
                    true
                }
                None => false,
            },
            MessageTemplate::KeyValue(_) => false,
        }
    }

    pub fn remove_message(&mut self, index: usize) -> Option<String> {
        match self {
            MessageTemplate::Messages { messages, .. } if index < messages.len() => {
                Some(messages.remove(index))
            }
            _ => None,
        }
    }
}

impl Serialize for MessageTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Read a template file as raw JSON, ready for [`MessageTemplate::check`].
pub async fn load_template_file(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}
