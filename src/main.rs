// src/main.rs

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_crud::config::{parse_direction, ClientConfig, Command, CommandLineInput, SubtaskCommand};
use notion_crud::constants::NOTION_API_PAGE_SIZE;
use notion_crud::{
    blocks_to_markdown, parse_markdown_to_blocks, todo_database_schema, Block, BlockId, NewTodo,
    NotionWorkspace, PageId, Priority,
};
use serde::Serialize;
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_crud.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    // Logs go to stderr so stdout stays clean JSON or markdown.
    let stderr_appender = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &std::path::Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Commands that never talk to Notion.
fn run_offline(command: &Command) -> anyhow::Result<bool> {
    match command {
        Command::Parse { file } => {
            let blocks = parse_markdown_to_blocks(&read_file(file)?)?;
            print_json(&blocks)?;
        }
        Command::Render { file } => {
            let blocks: Vec<Block> = serde_json::from_str(&read_file(file)?)
                .with_context(|| format!("{} is not a JSON array of blocks", file.display()))?;
            println!("{}", blocks_to_markdown(&blocks));
        }
        _ => return Ok(false),
    }
    Ok(true)
}

async fn run(cli: CommandLineInput) -> anyhow::Result<()> {
    if run_offline(&cli.command)? {
        return Ok(());
    }

    let config = ClientConfig::resolve(&cli)?;
    let workspace = NotionWorkspace::from_config(&config)?;

    match cli.command {
        Command::Parse { .. } | Command::Render { .. } => {}

        Command::Append {
            parent,
            file,
            after,
            batch_size,
        } => {
            let parent = BlockId::parse(&parent)?;
            let after = after.as_deref().map(BlockId::parse).transpose()?;
            let blocks = parse_markdown_to_blocks(&read_file(&file)?)?;
            let outcome = workspace
                .blocks
                .append_children(&parent, &blocks, after.as_ref(), batch_size)
                .await?;
            print_json(&outcome)?;
        }

        Command::Export { block } => {
            let markdown = workspace.export_markdown(&BlockId::parse(&block)?).await?;
            println!("{}", markdown);
        }

        Command::GetBlock { id } => {
            print_json(&workspace.blocks.get_block(&BlockId::parse(&id)?).await?)?;
        }

        Command::Children {
            id,
            page_size,
            cursor,
        } => {
            let children = workspace
                .blocks
                .get_children(&BlockId::parse(&id)?, page_size, cursor.as_deref())
                .await?;
            print_json(&children)?;
        }

        Command::DeleteBlock { id } => {
            print_json(&workspace.blocks.delete_block(&BlockId::parse(&id)?).await?)?;
        }

        Command::AddTodo {
            task,
            description,
            due,
            priority,
            tags,
            status,
        } => {
            let database = config.require_database()?;
            let due_date = due
                .as_deref()
                .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
                .transpose()
                .context("--due must be a YYYY-MM-DD date")?;
            let todo = NewTodo {
                task,
                description,
                due_date,
                priority: priority.as_deref().map(str::parse::<Priority>).transpose()?,
                tags,
                status,
            };
            print_json(&workspace.add_todo(database, &todo).await?)?;
        }

        Command::SearchTodos {
            query,
            property,
            sort_by,
            direction,
        } => {
            let database = config.require_database()?;
            let todos = workspace
                .search_todos(
                    database,
                    &query,
                    property.as_deref(),
                    sort_by.as_deref(),
                    parse_direction(&direction)?,
                )
                .await?;
            print_json(&todos)?;
        }

        Command::Subtask(SubtaskCommand::Add {
            parent,
            content,
            checked,
        }) => {
            let created = workspace
                .blocks
                .create_subtask(&BlockId::parse(&parent)?, &content, checked, None)
                .await?;
            print_json(&created)?;
        }

        Command::Subtask(SubtaskCommand::List { parent }) => {
            let subtasks = workspace
                .blocks
                .get_subtasks(&BlockId::parse(&parent)?, NOTION_API_PAGE_SIZE)
                .await?;
            print_json(&subtasks)?;
        }

        Command::Subtask(SubtaskCommand::Check {
            subtask,
            uncheck,
            no_parent_update,
        }) => {
            let updated = workspace
                .blocks
                .update_subtask_status(&BlockId::parse(&subtask)?, !uncheck, !no_parent_update)
                .await?;
            print_json(&updated)?;
        }

        Command::Archive { page } => {
            print_json(&workspace.pages.archive_page(&PageId::parse(&page)?).await?)?;
        }

        Command::Restore { page } => {
            print_json(&workspace.pages.restore_page(&PageId::parse(&page)?).await?)?;
        }

        Command::GetPage { id } => {
            print_json(&workspace.pages.get_page(&PageId::parse(&id)?).await?)?;
        }

        Command::CreateDatabase { title, parent } => {
            let parent = match parent {
                Some(parent) => PageId::parse(&parent)?,
                None => config.parent_page_id.clone().context(
                    "Pass --parent or set the NOTION_PARENT_PAGE_ID environment variable",
                )?,
            };
            let database = workspace
                .databases
                .create_database(&parent, &title, &todo_database_schema())
                .await?;
            print_json(&database)?;
        }

        Command::ListDatabases => {
            let databases = workspace
                .databases
                .list_databases(NOTION_API_PAGE_SIZE, None)
                .await?;
            print_json(&databases)?;
        }

        Command::Verify => {
            print_json(&workspace.verify_connection().await?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenv::dotenv().ok();

    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).map_err(|e| anyhow::anyhow!("Failed to set up logging: {}", e))?;

    run(cli).await
}
