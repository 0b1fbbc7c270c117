use std::io;

use log::debug;
use serde::Serialize;

use crate::{
    error::Result,
    fmt::{FormatWriter, Release},
    link_style::Links,
    sectionmap::{Entry, SectionKey, SectionMap},
};

/// Wraps a `std::io::Write` object to write `chlog` output in a JSON format
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use chlog::{Links, SectionMap, fmt::{FormatWriter, JsonWriter, Release}};
/// let sm = SectionMap::from_commits(vec![]);
///
/// // Create a file to hold our results, which the JsonWriter will wrap (note, .unwrap() is only
/// // used to keep the example short and concise)
/// let mut file = File::create("my_changelog.json").unwrap();
///
/// let mut writer = JsonWriter::new(&mut file, Links::default());
/// writer.write_changelog(&Release::today("1.0.0").unwrap(), &sm).unwrap();
/// ```
pub struct JsonWriter<'a> {
    out: &'a mut dyn io::Write,
    links: Links,
}

#[derive(Serialize)]
struct JsonChangelog<'a> {
    version: &'a str,
    date: &'a str,
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    key: String,
    title: &'static str,
    components: Vec<JsonComponent<'a>>,
}

#[derive(Serialize)]
struct JsonComponent<'a> {
    component: Option<&'a str>,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsonEntry<'a> {
    Commit {
        subject: &'a str,
        hash: &'a str,
        commit_link: String,
        closes: Vec<JsonIssue>,
    },
    BreakingChange {
        description: &'a str,
        hash: &'a str,
        commit_link: String,
    },
}

#[derive(Serialize)]
struct JsonIssue {
    issue: u32,
    issue_link: Option<String>,
}

impl<'a> JsonWriter<'a> {
    /// Creates a new instance of the `JsonWriter` struct using a
    /// `std::io::Write` object.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use std::io::{stdout, BufWriter};
    /// # use chlog::{Links, fmt::JsonWriter};
    /// // Create a JsonWriter to wrap stdout
    /// let out = stdout();
    /// let mut out_buf = BufWriter::new(out.lock());
    /// let mut writer = JsonWriter::new(&mut out_buf, Links::default());
    /// ```
    pub fn new<T: io::Write + 'a>(writer: &'a mut T, links: Links) -> JsonWriter<'a> {
        JsonWriter { out: writer, links }
    }

    fn section<'s>(&self, key: SectionKey, sm: &'s SectionMap) -> JsonSection<'s> {
        debug!("Writing section: {}", key.title());
        JsonSection {
            key: key.to_string(),
            title: key.title(),
            components: sm
                .sorted_components(key)
                .into_iter()
                .map(|(component, entries)| JsonComponent {
                    component,
                    entries: entries.iter().map(|e| self.entry(e)).collect(),
                })
                .collect(),
        }
    }

    fn entry<'s>(&self, entry: &'s Entry) -> JsonEntry<'s> {
        match entry {
            Entry::Commit(commit) => JsonEntry::Commit {
                subject: &commit.subject,
                hash: &commit.hash,
                commit_link: self.links.commit_url(&commit.hash),
                closes: commit
                    .closes
                    .iter()
                    .map(|&issue| JsonIssue {
                        issue,
                        issue_link: self.links.issue_url(issue),
                    })
                    .collect(),
            },
            Entry::BreakingChange { hash, description } => JsonEntry::BreakingChange {
                description,
                hash,
                commit_link: self.links.commit_url(hash),
            },
        }
    }
}

impl<'a> FormatWriter for JsonWriter<'a> {
    fn write_changelog(&mut self, release: &Release, sm: &SectionMap) -> Result<()> {
        debug!("Writing JSON changelog");
        let changelog = JsonChangelog {
            version: &release.version,
            date: &release.date,
            sections: sm
                .non_empty_sections()
                .map(|key| self.section(key, sm))
                .collect(),
        };

        serde_json::to_writer_pretty(&mut *self.out, &changelog)?;
        writeln!(self.out)?;
        debug!("Finished writing sections, flushing");
        self.out.flush().map_err(Into::into)
    }
}
