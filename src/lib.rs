// src/lib.rs
//! notion-crud library: create, read, update and delete Notion blocks, pages
//! and databases, with markdown <-> block conversion and todo helpers.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** - `AppError`, `RemoteError`, `ValidationError`
//! - **Configuration** - `ClientConfig`, `CommandLineInput`
//! - **Domain model** - `Block`, `Page`, `Database`, `PropertyValue`, `Todo`
//! - **Domain types** - `BlockId`, `PageId`, `ApiKey`, `RichText`, etc.
//! - **API clients** - `BlocksApi`, `PagesApi`, `DatabasesApi`, `NotionWorkspace`
//! - **Formatting** - `create_block`, `parse_markdown_to_blocks`, `blocks_to_markdown`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_recovery;
pub mod formatting;
pub mod model;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, RemoteError, RemoteErrorKind};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{ClientConfig, CommandLineInput};
pub use crate::error_recovery::{retry_with_backoff, retry_with_backoff_if, RetryPolicy};

// --- Domain Model ---
pub use crate::model::{
    create_todo_properties, todo_database_schema, Block, BlockBody, BlockKind, CodeContent,
    Database, DateValue, NewTodo, Page, Paginated, Parent, Priority, Properties, PropertySchema,
    PropertyValue, Schema, SelectOption, TextBlockContent, ToDoContent, Todo, TodoList,
};

// --- Domain Types ---
pub use crate::types::{
    plain_text, Annotations, ApiKey, BlockId, Color, DatabaseId, PageId, RichText, ValidatedUrl,
};

// --- API Clients ---
pub use crate::api::query::{
    create_date_filter, create_filter, create_number_filter, create_search_filter, create_sort,
    create_text_filter, DatabaseQuery, DateCondition, Filter, FilterOperator, NumberCondition,
    Sort, SortDirection, TextCondition,
};
pub use crate::api::{
    fetch_all_pages, ApiRequest, AppendOutcome, BlocksApi, DatabasesApi, HttpMethod,
    NotionHttpClient, NotionTransport, NotionWorkspace, PagesApi, RetryingTransport,
};

// --- Formatting ---
pub use crate::formatting::{
    blocks_to_markdown, bulleted_list_item, create_block, create_rich_text,
    parse_markdown_to_blocks, rich_text_block, todo,
};
