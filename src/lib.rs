//! Generates a Markdown changelog from `git` history written in the
//! `<type>(<component>): <subject>` commit convention.
//!
//! Commits are collected since the previous tag, grouped into Bug Fixes,
//! Features, Performance Improvements and Breaking Changes, then by
//! component, and written through a [`fmt::FormatWriter`].
//!
//! ```no_run
//! # use chlog::Chlog;
//! # async fn run() -> chlog::error::Result<()> {
//! Chlog::new()?.version("1.2.0").outfile("CHANGELOG.md").generate().await
//! # }
//! ```

#[macro_use]
mod macros;
mod chlog;
pub mod config;
pub mod error;
pub mod fmt;
pub mod git;
mod link_style;
mod parser;
mod sectionmap;
#[cfg(test)]
mod test_log;

pub use chlog::Chlog;
pub use link_style::{repository_link, short_hash, LinkStyle, Links};
pub use parser::CommitParser;
pub use sectionmap::{ComponentMap, Entry, SectionKey, SectionMap};

// The default config file
const DEFAULT_CONFIG_FILE: &str = ".chlog.toml";
// npm metadata, read when there is no config file
const PACKAGE_FILE: &str = "package.json";
