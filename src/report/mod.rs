//! Report generation module.
//!
//! Renders the analysis results as Markdown or JSON.

mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_report};
