mod json_writer;
mod md_writer;

use std::{result::Result as StdResult, str::FromStr};

use strum::{Display, EnumString};
use time::{macros::format_description, OffsetDateTime};

pub use self::{json_writer::JsonWriter, md_writer::MarkdownWriter};
use crate::{error::Result, sectionmap::SectionMap};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ChangelogFormat {
    Json,
    #[default]
    Markdown,
}

impl<'de> serde::de::Deserialize<'de> for ChangelogFormat {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The release a changelog is written for, i.e. what goes into its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl Release {
    pub fn new<S: Into<String>>(version: S, date: S) -> Self {
        Release {
            version: version.into(),
            date: date.into(),
        }
    }

    /// A release dated today, in local time if the offset can be determined
    /// and UTC otherwise
    pub fn today<S: Into<String>>(version: S) -> Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let date = now.format(format_description!("[year]-[month]-[day]"))?;

        Ok(Release {
            version: version.into(),
            date,
        })
    }
}

/// A trait that allows writing the results of a `chlog` run which can then be
/// written in an arbitrary format. The single required function
/// `write_changelog()` accepts a `chlog::SectionMap` which can be thought of
/// similiar to a `chlog` "AST" of sorts.
///
/// `chlog` provides two default implementors of this trait,
/// `chlog::fmt::MarkdownWriter` and `chlog::fmt::JsonWriter` for writing
/// Markdown and JSON respectively
pub trait FormatWriter {
    /// Writes a changelog from a given `chlog::SectionMap` which can be thought
    /// of as an "AST" of sorts
    fn write_changelog(&mut self, release: &Release, section_map: &SectionMap) -> Result<()>;
}
