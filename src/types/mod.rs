use thiserror::Error;

mod colors;
mod domain_types;
mod ids;
mod rich_text;

pub use colors::*;
pub use domain_types::*;
pub use ids::*;
pub use rich_text::*;

/// Input rejected before any request reaches Notion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid Notion ID format: {0}")]
    InvalidId(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Content length {actual} exceeds maximum of {max} characters")]
    ContentTooLong { actual: usize, max: usize },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid annotations: {0}")]
    InvalidAnnotations(String),

    #[error("Color annotation must be a string")]
    NonStringColor,

    #[error("Invalid block type: {0}")]
    InvalidBlockType(String),

    #[error("Invalid value for {field}: {value} (expected {expected})")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid property '{name}' for {block_type} block: {reason}")]
    InvalidBlockProperty {
        block_type: &'static str,
        name: String,
        reason: String,
    },

    #[error("Unclosed code block at end of markdown")]
    UnclosedCodeBlock,

    #[error("Error parsing line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("Must provide either properties or archived status")]
    NothingToUpdate,

    #[error("page_size must be positive")]
    NonPositivePageSize,

    #[error("batch_size cannot exceed Notion's limit of {max} blocks per request (got {actual})")]
    BatchTooLarge { actual: usize, max: usize },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },
}

impl ValidationError {
    /// The 1-based markdown line this error was raised on, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}
