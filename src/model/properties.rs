//! Page property values and database property schemas.
//!
//! Both are keyed on Notion's `type` field. Kinds this crate does not model
//! are carried as `Other` so that reading a page never fails on an exotic
//! property.

use crate::types::{plain_text, Color, RichText};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag of a page, in the order Notion returned it.
pub type Properties = IndexMap<String, PropertyValue>;

/// Schema of a database, by property name.
pub type Schema = IndexMap<String, PropertySchema>;

/// An option of a select, multi-select or status property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }

    pub fn colored(name: impl Into<String>, color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::named(name)
        }
    }
}

/// Value of a date property. `start` is an ISO 8601 date or datetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A typed page property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Number(Option<f64>),
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Status(Option<SelectOption>),
    Date(Option<DateValue>),
    Checkbox(bool),
    Url(Option<String>),
    Other { kind: String, payload: Value },
}

impl PropertyValue {
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::Title(_) => "title",
            PropertyValue::RichText(_) => "rich_text",
            PropertyValue::Number(_) => "number",
            PropertyValue::Select(_) => "select",
            PropertyValue::MultiSelect(_) => "multi_select",
            PropertyValue::Status(_) => "status",
            PropertyValue::Date(_) => "date",
            PropertyValue::Checkbox(_) => "checkbox",
            PropertyValue::Url(_) => "url",
            PropertyValue::Other { kind, .. } => kind,
        }
    }

    /// Visible text of title and rich text values.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropertyValue::Title(runs) | PropertyValue::RichText(runs) => Some(plain_text(runs)),
            _ => None,
        }
    }

    /// Name of the chosen option of a select or status value.
    pub fn option_name(&self) -> Option<&str> {
        match self {
            PropertyValue::Select(Some(option)) | PropertyValue::Status(Some(option)) => {
                Some(&option.name)
            }
            _ => None,
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            PropertyValue::Title(runs) | PropertyValue::RichText(runs) => {
                serde_json::to_value(runs)
            }
            PropertyValue::Number(n) => serde_json::to_value(n),
            PropertyValue::Select(option) | PropertyValue::Status(option) => {
                serde_json::to_value(option)
            }
            PropertyValue::MultiSelect(options) => serde_json::to_value(options),
            PropertyValue::Date(date) => serde_json::to_value(date),
            PropertyValue::Checkbox(b) => Ok(Value::Bool(*b)),
            PropertyValue::Url(url) => serde_json::to_value(url),
            PropertyValue::Other { payload, .. } => Ok(payload.clone()),
        }
    }

    fn from_payload(kind: String, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind.as_str() {
            "title" => PropertyValue::Title(serde_json::from_value(payload)?),
            "rich_text" => PropertyValue::RichText(serde_json::from_value(payload)?),
            "number" => PropertyValue::Number(serde_json::from_value(payload)?),
            "select" => PropertyValue::Select(serde_json::from_value(payload)?),
            "multi_select" => PropertyValue::MultiSelect(serde_json::from_value(payload)?),
            "status" => PropertyValue::Status(serde_json::from_value(payload)?),
            "date" => PropertyValue::Date(serde_json::from_value(payload)?),
            "checkbox" => PropertyValue::Checkbox(serde_json::from_value(payload)?),
            "url" => PropertyValue::Url(serde_json::from_value(payload)?),
            _ => PropertyValue::Other { kind, payload },
        })
    }
}

/// Sent as `{"<type>": <payload>}`, the shape page create and update accept.
impl Serialize for PropertyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let payload = self.payload().map_err(serde::ser::Error::custom)?;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.type_name(), &payload)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (kind, payload) = split_typed_object(Map::deserialize(deserializer)?)
            .map_err(D::Error::custom)?;
        PropertyValue::from_payload(kind.clone(), payload)
            .map_err(|e| D::Error::custom(format!("invalid {} property: {}", kind, e)))
    }
}

/// A typed database property definition.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySchema {
    Title,
    RichText,
    Number { format: Option<String> },
    Select { options: Vec<SelectOption> },
    MultiSelect { options: Vec<SelectOption> },
    Status { options: Vec<SelectOption> },
    Date,
    Checkbox,
    Url,
    Other { kind: String, payload: Value },
}

#[derive(Default, Serialize, Deserialize)]
struct OptionsPayload {
    #[serde(default)]
    options: Vec<SelectOption>,
}

#[derive(Default, Serialize, Deserialize)]
struct NumberPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

impl PropertySchema {
    pub fn type_name(&self) -> &str {
        match self {
            PropertySchema::Title => "title",
            PropertySchema::RichText => "rich_text",
            PropertySchema::Number { .. } => "number",
            PropertySchema::Select { .. } => "select",
            PropertySchema::MultiSelect { .. } => "multi_select",
            PropertySchema::Status { .. } => "status",
            PropertySchema::Date => "date",
            PropertySchema::Checkbox => "checkbox",
            PropertySchema::Url => "url",
            PropertySchema::Other { kind, .. } => kind,
        }
    }

    /// Options of a select-like schema entry.
    pub fn options(&self) -> &[SelectOption] {
        match self {
            PropertySchema::Select { options }
            | PropertySchema::MultiSelect { options }
            | PropertySchema::Status { options } => options,
            _ => &[],
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        let options = |options: &[SelectOption]| {
            serde_json::to_value(OptionsPayload {
                options: options.to_vec(),
            })
        };
        match self {
            PropertySchema::Select { options: o }
            | PropertySchema::MultiSelect { options: o }
            | PropertySchema::Status { options: o } => options(o),
            PropertySchema::Number { format } => serde_json::to_value(NumberPayload {
                format: format.clone(),
            }),
            PropertySchema::Other { payload, .. } => Ok(payload.clone()),
            PropertySchema::Title
            | PropertySchema::RichText
            | PropertySchema::Date
            | PropertySchema::Checkbox
            | PropertySchema::Url => Ok(Value::Object(Map::new())),
        }
    }

    fn from_payload(kind: String, payload: Value) -> Result<Self, serde_json::Error> {
        let options = |payload: Value| -> Result<Vec<SelectOption>, serde_json::Error> {
            if payload.is_null() {
                return Ok(Vec::new());
            }
            Ok(serde_json::from_value::<OptionsPayload>(payload)?.options)
        };
        Ok(match kind.as_str() {
            "title" => PropertySchema::Title,
            "rich_text" => PropertySchema::RichText,
            "number" => PropertySchema::Number {
                format: serde_json::from_value::<Option<NumberPayload>>(payload)?
                    .and_then(|n| n.format),
            },
            "select" => PropertySchema::Select {
                options: options(payload)?,
            },
            "multi_select" => PropertySchema::MultiSelect {
                options: options(payload)?,
            },
            "status" => PropertySchema::Status {
                options: options(payload)?,
            },
            "date" => PropertySchema::Date,
            "checkbox" => PropertySchema::Checkbox,
            "url" => PropertySchema::Url,
            _ => PropertySchema::Other { kind, payload },
        })
    }
}

/// Sent as `{"type": "<type>", "<type>": <config>}`.
impl Serialize for PropertySchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let payload = self.payload().map_err(serde::ser::Error::custom)?;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", self.type_name())?;
        map.serialize_entry(self.type_name(), &payload)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertySchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (kind, payload) = split_typed_object(Map::deserialize(deserializer)?)
            .map_err(D::Error::custom)?;
        PropertySchema::from_payload(kind.clone(), payload)
            .map_err(|e| D::Error::custom(format!("invalid {} schema: {}", kind, e)))
    }
}

/// Splits `{"id": .., "type": k, k: payload}` into `(k, payload)`.
///
/// Request-shaped objects have no `type` key; there the single remaining
/// key (ignoring `id` and `name`) names the kind.
fn split_typed_object(mut map: Map<String, Value>) -> Result<(String, Value), String> {
    let kind = match map.remove("type") {
        Some(Value::String(kind)) => kind,
        Some(other) => return Err(format!("property type must be a string, got {}", other)),
        None => map
            .keys()
            .find(|key| !matches!(key.as_str(), "id" | "name"))
            .cloned()
            .ok_or_else(|| "property object has no type".to_string())?,
    };
    let payload = map.remove(&kind).unwrap_or(Value::Null);
    Ok((kind, payload))
}
