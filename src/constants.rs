//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// Root of every REST path the clients build.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// Value of the `Notion-Version` header sent on every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Most children Notion accepts in one append-children request.
pub const MAX_BLOCKS_PER_APPEND: usize = 100;

/// Longest text content of a single rich text run.
pub const MAX_TEXT_LENGTH: usize = 2000;

// ---------------------------------------------------------------------------
// Todo databases
// ---------------------------------------------------------------------------

pub const TODO_TASK_PROPERTY: &str = "Task";
pub const TODO_DESCRIPTION_PROPERTY: &str = "Description";
pub const TODO_DUE_DATE_PROPERTY: &str = "Due Date";
pub const TODO_PRIORITY_PROPERTY: &str = "Priority";
pub const TODO_TAGS_PROPERTY: &str = "Tags";
pub const TODO_STATUS_PROPERTY: &str = "Status";

/// Status given to a todo created without one.
pub const TODO_DEFAULT_STATUS: &str = "Not Started";

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Attempts made for a transient failure, counting the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubled after each further failure.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound on a single backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Default client-wide request deadline, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
