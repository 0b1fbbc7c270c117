use log::warn;
use regex::Regex;

use crate::git::{Commit, RawCommit};

/// Turns raw `git log` records into [`Commit`]s.
///
/// The subject line has to look like `<type>(<component>): <subject>`:
///
/// * `type`: one or more characters, neither whitespace nor parentheses
/// * `component`: anything but parentheses, may be empty but the parentheses
///   themselves are required
/// * `subject`: everything after the colon and its whitespace, non-empty
///
/// Independently of the subject, every body line mentioning `Closes #N` or
/// `Fixes #N` adds `N` to the closed issues, and everything after a
/// `BREAKING CHANGE:` marker becomes the breaking change description.
#[derive(Debug, Clone)]
pub struct CommitParser {
    /// The regex used to get the type, component and subject
    pub subject_regex: Regex,
    /// The regex used to get closes issue links
    pub closes_regex: Regex,
    /// The regex used to get the breaking change description
    pub breaking_regex: Regex,
}

impl Default for CommitParser {
    fn default() -> Self {
        CommitParser {
            subject_regex: regex!(
                r"^(?P<type>[^\s()]+)\((?P<component>[^()]*)\):\s+(?P<subject>\S.*)$"
            ),
            closes_regex: regex!(r"(?:Closes|Fixes)\s#(\d+)"),
            breaking_regex: regex!(r"(?s)BREAKING CHANGE:(.*)"),
        }
    }
}

impl CommitParser {
    pub fn new() -> Self {
        CommitParser::default()
    }

    /// Parses a `hash\nsubject\nbody...` block
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::CommitParser;
    /// let parser = CommitParser::new();
    /// let commit = parser
    ///     .parse_str("0123456789abcdef0123456789abcdef01234567\nfeat(cli): add --dry-run")
    ///     .unwrap();
    ///
    /// assert_eq!(commit.commit_type, "feat");
    /// assert_eq!(commit.component.as_deref(), Some("cli"));
    /// assert_eq!(commit.subject, "add --dry-run");
    /// ```
    pub fn parse_str(&self, block: &str) -> Option<Commit> {
        RawCommit::from_block(block).and_then(|raw| self.parse(&raw))
    }

    /// Parses a single raw commit, returns `None` (after logging a warning)
    /// when the subject doesn't follow the commit grammar.
    pub fn parse(&self, raw: &RawCommit) -> Option<Commit> {
        if raw.hash.is_empty() {
            return None;
        }

        let subject_line = raw.subject.trim_end();
        let Some(caps) = self.subject_regex.captures(subject_line) else {
            warn!("incorrect message: {} {}", raw.hash, subject_line);
            return None;
        };

        let component = caps
            .name("component")
            .map(|m| m.as_str().trim())
            .filter(|c| !c.is_empty())
            .map(str::to_owned);

        let closes: Vec<u32> = raw
            .body
            .iter()
            .filter_map(|line| self.closes_regex.captures(line))
            .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
            .collect();

        let breaking = self
            .breaking_regex
            .captures(&raw.text())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|b| !b.is_empty());

        Some(Commit {
            hash: raw.hash.clone(),
            commit_type: caps["type"].to_owned(),
            component,
            subject: caps["subject"].to_owned(),
            body: raw.body.join("\n"),
            closes,
            breaking,
        })
    }
}
