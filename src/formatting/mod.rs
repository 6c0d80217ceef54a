// src/formatting/mod.rs
//! Builds Notion blocks and converts them to and from markdown.

pub mod builders;
pub mod markdown;

pub use self::builders::{bulleted_list_item, create_block, create_rich_text, rich_text_block, todo};
pub use self::markdown::{blocks_to_markdown, parse_markdown_to_blocks};
