mod block;
pub mod config;
mod error;
pub mod generator;
mod html;
pub mod output;
mod parser;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod template;

pub use block::{Block, List, ListItem, Span};
pub use config::Config;
pub use error::{Error, Result};
pub use generator::{CohereClient, Generate};
pub use output::{OutputFiles, sanitize_stem};
pub use pipeline::{BookRequest, Pipeline, Step};
pub use render::{Render, WkHtmlToPdf};
pub use template::{PLACEHOLDER, Template, TemplateStore};

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let blocks = parse(markdown);
    html::blocks_to_html(&blocks)
}
