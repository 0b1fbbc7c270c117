use std::io;

use crate::{
    error::Result,
    fmt::{FormatWriter, Release},
    link_style::Links,
    sectionmap::{Entry, SectionKey, SectionMap},
};

/// Wraps a `std::io::Write` object to write `chlog` output in a Markdown format
///
/// # Example
///
/// ```
/// # use chlog::{CommitParser, Links, SectionMap};
/// # use chlog::fmt::{FormatWriter, MarkdownWriter, Release};
/// let parser = CommitParser::new();
/// let commit = parser
///     .parse_str("0123456789abcdef0123456789abcdef01234567\nfix(core): handle null")
///     .unwrap();
/// let sm = SectionMap::from_commits(vec![commit]);
///
/// let mut out = Vec::new();
/// let mut writer = MarkdownWriter::new(&mut out, Links::default());
/// writer
///     .write_changelog(&Release::new("1.2.0", "2024-01-15"), &sm)
///     .unwrap();
///
/// let md = String::from_utf8(out).unwrap();
/// assert!(md.starts_with("# 1.2.0 (2024-01-15)\n"));
/// assert!(md.contains("- **core:** handle null ([01234567](#))"));
/// ```
pub struct MarkdownWriter<'a> {
    out: &'a mut dyn io::Write,
    links: Links,
}

impl<'a> MarkdownWriter<'a> {
    /// Creates a new instance of the `MarkdownWriter` struct using a
    /// `std::io::Write` object and the links of the repository the commits
    /// belong to.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use std::io::BufWriter;
    /// # use chlog::{Links, fmt::MarkdownWriter};
    /// // Create a MarkdownWriter to wrap stdout
    /// let out = std::io::stdout();
    /// let mut out_buf = BufWriter::new(out.lock());
    /// let mut writer = MarkdownWriter::new(&mut out_buf, Links::default());
    /// ```
    pub fn new<T: io::Write + 'a>(writer: &'a mut T, links: Links) -> MarkdownWriter<'a> {
        MarkdownWriter { out: writer, links }
    }

    fn write_header(&mut self, release: &Release) -> Result<()> {
        writeln!(self.out, "# {} ({})", release.version, release.date).map_err(Into::into)
    }

    /// Writes a particular section of a changelog
    fn write_section(&mut self, key: SectionKey, sm: &SectionMap) -> Result<()> {
        let components = sm.sorted_components(key);
        if components.is_empty() {
            return Ok(());
        }

        write!(self.out, "\n## {}\n\n", key.title())?;

        // breaking change entries carry their commit link in the text already
        let commit_links = key != SectionKey::Breaks;

        for (component, entries) in components {
            let (prefix, indent) = match component {
                Some(name) if entries.len() > 1 => {
                    writeln!(self.out, "- **{name}:**")?;
                    ("  -".to_owned(), "    ")
                }
                Some(name) => (format!("- **{name}:**"), "  "),
                None => ("-".to_owned(), "  "),
            };

            for entry in entries {
                let text = self.entry_text(entry, commit_links);
                self.write_entry(&prefix, indent, &text)?;
            }
        }

        Ok(())
    }

    fn entry_text(&self, entry: &Entry, commit_links: bool) -> String {
        match entry {
            Entry::Commit(commit) if commit_links => {
                let mut links = vec![self.links.commit_link(&commit.hash)];
                links.extend(commit.closes.iter().map(|&i| self.links.issue_link(i)));
                format!("{} ({})", commit.subject, links.join(", "))
            }
            Entry::Commit(commit) => commit.subject.clone(),
            Entry::BreakingChange { hash, description } => {
                format!("due to {},\n{description}", self.links.commit_link(hash))
            }
        }
    }

    /// Writes one bullet, continuation lines are indented below it
    fn write_entry(&mut self, prefix: &str, indent: &str, text: &str) -> Result<()> {
        let mut lines = text.lines();
        writeln!(self.out, "{prefix} {}", lines.next().unwrap_or_default())?;
        for line in lines {
            if line.trim().is_empty() {
                writeln!(self.out)?;
            } else {
                writeln!(self.out, "{indent}{line}")?;
            }
        }
        Ok(())
    }
}

impl<'a> FormatWriter for MarkdownWriter<'a> {
    fn write_changelog(&mut self, release: &Release, sm: &SectionMap) -> Result<()> {
        self.write_header(release)?;

        for key in SectionKey::ALL {
            self.write_section(key, sm)?;
        }

        self.out.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{git::Commit, link_style::LinkStyle};

    const REPO: &str = "https://github.com/owner/repo";

    fn commit(hash: char, commit_type: &str, component: Option<&str>, subject: &str) -> Commit {
        Commit {
            hash: hash.to_string().repeat(40),
            commit_type: commit_type.to_owned(),
            component: component.map(str::to_owned),
            subject: subject.to_owned(),
            body: String::new(),
            closes: vec![],
            breaking: None,
        }
    }

    fn render(commits: Vec<Commit>) -> String {
        let sm = SectionMap::from_commits(commits);
        let links = Links::new(Some("owner/repo"), None, LinkStyle::Github);
        let mut out = Vec::new();
        MarkdownWriter::new(&mut out, links)
            .write_changelog(&Release::new("1.2.0", "2024-01-15"), &sm)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn link(hash: char) -> String {
        let full = hash.to_string().repeat(40);
        format!("[{}]({REPO}/commit/{full})", &full[..8])
    }

    #[test]
    fn header_only() {
        assert_eq!(render(vec![]), "# 1.2.0 (2024-01-15)\n");
    }

    #[test]
    fn fix_and_feature() {
        let md = render(vec![
            commit('a', "fix", Some("core"), "handle null"),
            commit('b', "feat", Some("core"), "add widget"),
        ]);

        let expected = format!(
            "# 1.2.0 (2024-01-15)\n\
             \n## Bug Fixes\n\n\
             - **core:** handle null ({})\n\
             \n## Features\n\n\
             - **core:** add widget ({})\n",
            link('a'),
            link('b')
        );
        assert_eq!(md, expected);
        assert!(!md.contains("## Performance Improvements"));
        assert!(!md.contains("## Breaking Changes"));
    }

    #[test]
    fn components_in_lexicographic_order() {
        let md = render(vec![
            commit('a', "feat", Some("zeta"), "last"),
            commit('b', "feat", Some("alpha"), "first"),
        ]);

        let alpha = md.find("**alpha:**").unwrap();
        let zeta = md.find("**zeta:**").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn nested_component() {
        let md = render(vec![
            commit('a', "perf", Some("db"), "cache queries"),
            commit('b', "perf", Some("db"), "batch writes"),
        ]);

        let expected = format!(
            "\n## Performance Improvements\n\n\
             - **db:**\n  \
             - cache queries ({})\n  \
             - batch writes ({})\n",
            link('a'),
            link('b')
        );
        assert!(md.ends_with(&expected), "{md}");
    }

    #[test]
    fn no_component() {
        let md = render(vec![
            commit('a', "fix", None, "one"),
            commit('b', "fix", None, "two"),
            commit('c', "fix", Some("api"), "three"),
        ]);

        let expected = format!(
            "- one ({})\n- two ({})\n- **api:** three ({})\n",
            link('a'),
            link('b'),
            link('c')
        );
        assert!(md.ends_with(&expected), "{md}");
        assert!(!md.contains("**:**"));
    }

    #[test]
    fn closed_issues_follow_commit_link() {
        let mut c = commit('a', "fix", Some("io"), "close handles");
        c.closes = vec![12, 13];
        let md = render(vec![c]);

        assert!(md.contains(&format!(
            "- **io:** close handles ({}, [#12]({REPO}/issues/12), [#13]({REPO}/issues/13))\n",
            link('a')
        )));
    }

    #[test]
    fn breaking_change_in_both_sections() {
        let mut c = commit('a', "fix", Some("api"), "drop v1 endpoints");
        c.breaking = Some("The `/v1` routes are gone.\nUse `/v2`.".to_owned());
        let md = render(vec![c]);

        assert!(md.contains(&format!(
            "## Bug Fixes\n\n- **api:** drop v1 endpoints ({})\n",
            link('a')
        )));
        let breaks = md.split("## Breaking Changes\n\n").nth(1).unwrap();
        assert_eq!(
            breaks,
            format!(
                "- **api:** due to {},\n  The `/v1` routes are gone.\n  Use `/v2`.\n",
                link('a')
            )
        );
        // no trailing link group after the description
        assert!(!breaks.contains("`.)"));
        assert!(md.find("## Bug Fixes").unwrap() < md.find("## Breaking Changes").unwrap());
    }

    #[test]
    fn malformed_commits_are_absent() {
        let parser = crate::parser::CommitParser::new();
        let commits = [
            "cccccccccccccccccccccccccccccccccccccccc\nfix: something",
            "dddddddddddddddddddddddddddddddddddddddd\nfix(core): handle null",
        ]
        .iter()
        .filter_map(|raw| parser.parse_str(raw))
        .collect();
        let md = render(commits);

        assert!(!md.contains("something"));
        assert!(md.contains("handle null"));
    }
}
