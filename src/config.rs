// src/config.rs
use crate::api::query::SortDirection;
use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_BLOCKS_PER_APPEND};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::types::{ApiKey, DatabaseId, PageId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Timeout for each Notion request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Attempts per request for transient failures (1 = no retry)
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a markdown file to Notion blocks (JSON on stdout)
    Parse { file: PathBuf },

    /// Convert a JSON array of blocks to markdown
    Render { file: PathBuf },

    /// Append a markdown file under a page or block
    Append {
        parent: String,
        file: PathBuf,
        /// Insert after this sibling block
        #[arg(long)]
        after: Option<String>,
        #[arg(long, default_value_t = MAX_BLOCKS_PER_APPEND)]
        batch_size: usize,
    },

    /// Export the children of a page or block as markdown
    Export { block: String },

    GetBlock { id: String },

    /// List one page of a block's children
    Children {
        id: String,
        #[arg(long, default_value_t = 100)]
        page_size: u32,
        #[arg(long)]
        cursor: Option<String>,
    },

    DeleteBlock { id: String },

    /// Add a row to the todo database (NOTION_DATABASE_ID)
    AddTodo {
        #[arg(long)]
        task: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// high, medium or low
        #[arg(long)]
        priority: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Search the todo database
    SearchTodos {
        query: String,
        /// Rich text property to search instead of the title
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long, default_value = "ascending")]
        direction: String,
    },

    /// Manage subtasks of a to-do block
    #[command(subcommand)]
    Subtask(SubtaskCommand),

    Archive { page: String },

    Restore { page: String },

    GetPage { id: String },

    /// Create a todo database under a page
    CreateDatabase {
        #[arg(long)]
        title: String,
        /// Parent page (defaults to NOTION_PARENT_PAGE_ID)
        #[arg(long)]
        parent: Option<String>,
    },

    ListDatabases,

    /// Check that the API key works
    Verify,
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    Add {
        parent: String,
        content: String,
        #[arg(long, default_value_t = false)]
        checked: bool,
    },
    List {
        parent: String,
    },
    /// Set a subtask's checked state and update its parent
    Check {
        subtask: String,
        /// Mark the subtask as not done
        #[arg(long, default_value_t = false)]
        uncheck: bool,
        /// Leave the parent to-do untouched
        #[arg(long, default_value_t = false)]
        no_parent_update: bool,
    },
}

/// Settings for talking to Notion, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub database_id: Option<DatabaseId>,
    pub parent_page_id: Option<PageId>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Reads `NOTION_API_KEY`, `NOTION_DATABASE_ID` and `NOTION_PARENT_PAGE_ID`.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let api_key_str = std::env::var("NOTION_API_KEY").map_err(|_| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;
        let api_key = ApiKey::new(api_key_str)?;

        Ok(ClientConfig {
            api_key,
            database_id: optional_env("NOTION_DATABASE_ID")
                .map(|id| DatabaseId::parse(&id))
                .transpose()?,
            parent_page_id: optional_env("NOTION_PARENT_PAGE_ID")
                .map(|id| PageId::parse(&id))
                .transpose()?,
            timeout: Duration::from_secs(cli.timeout_secs),
            retry: RetryPolicy::default().with_max_attempts(cli.max_retries),
        })
    }

    /// The todo database, required by the todo commands.
    pub fn require_database(&self) -> Result<&DatabaseId, AppError> {
        self.database_id.as_ref().ok_or_else(|| {
            AppError::MissingConfiguration(
                "NOTION_DATABASE_ID environment variable not set".to_string(),
            )
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a `--direction` flag.
pub fn parse_direction(direction: &str) -> Result<SortDirection, AppError> {
    Ok(direction.parse::<SortDirection>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_have_defaults() {
        let cli = CommandLineInput::parse_from(["notion-crud", "verify"]);
        assert!(!cli.verbose);
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.max_retries, 3);
        assert!(matches!(cli.command, Command::Verify));
    }

    #[test]
    fn subcommands_parse() {
        let cli = CommandLineInput::parse_from([
            "notion-crud",
            "--verbose",
            "append",
            "59833787-2cf9-4fdf-8782-e53db20768a5",
            "notes.md",
            "--batch-size",
            "50",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Append {
                batch_size, after, ..
            } => {
                assert_eq!(batch_size, 50);
                assert!(after.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = CommandLineInput::parse_from([
            "notion-crud",
            "add-todo",
            "--task",
            "Buy milk",
            "--tag",
            "home",
            "--tag",
            "errand",
        ]);
        match cli.command {
            Command::AddTodo { task, tags, .. } => {
                assert_eq!(task, "Buy milk");
                assert_eq!(tags, vec!["home", "errand"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = CommandLineInput::parse_from(["notion-crud", "subtask", "check", "abc", "--uncheck"]);
        assert!(matches!(
            cli.command,
            Command::Subtask(SubtaskCommand::Check { uncheck: true, .. })
        ));
    }

    #[test]
    fn direction_is_validated() {
        assert_eq!(parse_direction("descending").unwrap(), SortDirection::Descending);
        assert!(parse_direction("sideways").is_err());
    }
}
