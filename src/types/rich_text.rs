//! Inline text runs and their formatting annotations.

use super::{Color, ValidatedUrl, ValidationError};
use crate::constants::MAX_TEXT_LENGTH;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only annotation keys Notion accepts on a text run.
pub const ANNOTATION_KEYS: [&str; 6] = [
    "bold",
    "italic",
    "strikethrough",
    "underline",
    "code",
    "color",
];

/// Formatting for a text run. Unset fields are omitted on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Annotations {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Validates a caller-supplied annotation object.
    ///
    /// Rejects keys outside [`ANNOTATION_KEYS`], non-boolean style flags and
    /// a `color` that is not a string naming a Notion color.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let map = value.as_object().ok_or_else(|| {
            ValidationError::InvalidAnnotations("annotations must be an object".to_string())
        })?;

        let mut unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| !ANNOTATION_KEYS.contains(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(ValidationError::InvalidAnnotations(unknown.join(", ")));
        }

        let flag = |key: &str| -> Result<Option<bool>, ValidationError> {
            match map.get(key) {
                None => Ok(None),
                Some(Value::Bool(b)) => Ok(Some(*b)),
                Some(other) => Err(ValidationError::InvalidAnnotations(format!(
                    "{} must be a boolean, got {}",
                    key, other
                ))),
            }
        };

        let color = match map.get("color") {
            None => None,
            Some(Value::String(name)) => Some(name.parse::<Color>()?),
            Some(_) => return Err(ValidationError::NonStringColor),
        };

        Ok(Self {
            bold: flag("bold")?,
            italic: flag("italic")?,
            strikethrough: flag("strikethrough")?,
            underline: flag("underline")?,
            code: flag("code")?,
            color,
        })
    }
}

/// Hyperlink target of a text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

/// The `text` payload of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

/// One rich text object as Notion exchanges it.
///
/// Requests only ever carry `text` runs. Mentions and equations read back
/// from Notion are kept as text runs over their `plain_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    pub text: TextRun,
    pub annotations: Option<Annotations>,
    pub plain_text: Option<String>,
    pub href: Option<String>,
}

impl RichText {
    /// Builds a validated text run.
    ///
    /// Content must be non-blank and at most 2000 characters; it is stored
    /// trimmed. A link must be an http(s) URL.
    pub fn new(
        content: &str,
        link: Option<&str>,
        annotations: Option<Annotations>,
    ) -> Result<Self, ValidationError> {
        let content = validate_content(content)?;
        let link = link
            .map(ValidatedUrl::parse)
            .transpose()?
            .map(|url| Link {
                url: url.as_str().to_string(),
            });

        Ok(Self {
            text: TextRun {
                content: content.to_string(),
                link,
            },
            annotations,
            plain_text: None,
            href: None,
        })
    }

    /// The visible text of this run.
    pub fn content(&self) -> &str {
        &self.text.content
    }
}

/// Concatenates the visible text of a sequence of runs.
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(RichText::content).collect()
}

fn validate_content(content: &str) -> Result<&str, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    let length = content.chars().count();
    if length > MAX_TEXT_LENGTH {
        return Err(ValidationError::ContentTooLong {
            actual: length,
            max: MAX_TEXT_LENGTH,
        });
    }
    Ok(trimmed)
}

#[derive(Serialize)]
struct RichTextWire<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a TextRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<&'a Annotations>,
}

impl Serialize for RichText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RichTextWire {
            kind: "text",
            text: &self.text,
            annotations: self.annotations.as_ref(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
struct RawRichText {
    text: Option<TextRun>,
    annotations: Option<Annotations>,
    plain_text: Option<String>,
    href: Option<String>,
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawRichText::deserialize(deserializer)?;
        let text = raw.text.unwrap_or_else(|| TextRun {
            content: raw.plain_text.clone().unwrap_or_default(),
            link: raw.href.clone().map(|url| Link { url }),
        });
        Ok(Self {
            text,
            annotations: raw.annotations,
            plain_text: raw.plain_text,
            href: raw.href,
        })
    }
}
