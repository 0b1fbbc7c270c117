use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::process::Command;

use crate::error::{Error, Result};

/// The line `git log` prints after every commit, see [`LOG_FORMAT`]
pub const LOG_DELIMITER: &str = "==END==";

/// The `--format` handed to `git log`: hash, subject, body, delimiter
pub const LOG_FORMAT: &str = "%H%n%s%n%b%n==END==";

/// The default `--grep` pattern, i.e. every commit that might end up in a
/// section
pub const DEFAULT_GREP: &str = "^fix|^feat|^perf|BREAKING";

/// One commit exactly as `git log` printed it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommit {
    /// The 40 char hash
    pub hash: String,
    /// The untouched subject line
    pub subject: String,
    /// Every line after the subject
    pub body: Vec<String>,
}

impl RawCommit {
    /// Builds a raw commit from a block of text of the form
    /// `hash\nsubject\nbody...`. Returns `None` for blank blocks.
    pub fn from_block(block: &str) -> Option<RawCommit> {
        RawCommit::from_lines(block.lines())
    }

    fn from_lines<'a, I>(lines: I) -> Option<RawCommit>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lines = lines.into_iter().skip_while(|l| l.trim().is_empty());
        let hash = lines.next()?.trim().to_owned();
        let subject = lines.next().unwrap_or_default().to_owned();
        let mut body: Vec<String> = lines.map(str::to_owned).collect();
        while body.last().map_or(false, |l| l.trim().is_empty()) {
            body.pop();
        }

        Some(RawCommit {
            hash,
            subject,
            body,
        })
    }

    /// The whole commit as a single block of text
    pub fn text(&self) -> String {
        let mut text = format!("{}\n{}", self.hash, self.subject);
        for line in &self.body {
            text.push('\n');
            text.push_str(line);
        }
        text
    }
}

/// The struct representation of a parsed `Commit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The 40 char hash
    pub hash: String,
    /// The commit type, i.e. everything in front of the component
    pub commit_type: String,
    /// The component (if any)
    pub component: Option<String>,
    /// The commit subject
    pub subject: String,
    /// The body lines joined back together
    pub body: String,
    /// Any issues this commit closes
    pub closes: Vec<u32>,
    /// The text following a `BREAKING CHANGE:` marker
    pub breaking: Option<String>,
}

/// A convienience type for multiple commits
pub type Commits = Vec<Commit>;

/// Splits the output of `git log --format=LOG_FORMAT` into raw commits,
/// discarding empty records.
pub fn split_log(log: &str) -> Vec<RawCommit> {
    let mut commits = Vec::new();
    let mut block = Vec::new();

    for line in log.lines() {
        if line == LOG_DELIMITER {
            commits.extend(RawCommit::from_lines(block.drain(..)));
        } else {
            block.push(line);
        }
    }
    // output cut off before the final delimiter
    commits.extend(RawCommit::from_lines(block));

    commits
}

/// Runs the `git` executable against a (possibly non-current) repository
#[derive(Debug, Clone, Default)]
pub struct GitHistory {
    /// The git dir with all the meta-data (Typically the `.git` sub-directory
    /// of the project)
    pub git_dir: Option<PathBuf>,
    /// The working directory of the git project (typically the project
    /// directory, or parent of the `.git` directory)
    pub work_tree: Option<PathBuf>,
}

impl GitHistory {
    pub fn new() -> Self {
        GitHistory::default()
    }

    /// Uses the repository found at `dir`, which may either be the `.git`
    /// directory or the working tree containing it.
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        if dir.ends_with(".git") {
            debug!("dir ends with .git");
            GitHistory {
                git_dir: Some(dir.to_path_buf()),
                work_tree: dir.parent().map(Path::to_path_buf),
            }
        } else {
            debug!("dir doesn't end with .git");
            GitHistory {
                git_dir: Some(dir.join(".git")),
                work_tree: Some(dir.to_path_buf()),
            }
        }
    }

    pub fn git_dir<P: AsRef<Path>>(mut self, d: P) -> Self {
        self.git_dir = Some(d.as_ref().to_path_buf());
        self
    }

    pub fn work_tree<P: AsRef<Path>>(mut self, d: P) -> Self {
        self.work_tree = Some(d.as_ref().to_path_buf());
        self
    }

    /// The `--git-dir` and `--work-tree` flags, filling in whichever one the
    /// user left out from the other.
    fn location_args(&self) -> Vec<String> {
        let (git_dir, work_tree) = match (&self.git_dir, &self.work_tree) {
            (None, None) => return Vec::new(),
            (Some(g), Some(w)) => (g.clone(), w.clone()),
            (Some(g), None) => (g.clone(), g.parent().unwrap_or(g.as_path()).to_path_buf()),
            (None, Some(w)) => (w.join(".git"), w.clone()),
        };

        vec![
            format!("--git-dir={}", git_dir.display()),
            format!("--work-tree={}", work_tree.display()),
        ]
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(self.location_args());
        cmd
    }

    /// Retrieves the raw commits after `from` (or the whole history when
    /// `from` is `None`) up to `HEAD` whose message matches the extended
    /// regex `grep`.
    ///
    /// A failing `git log` is only logged and yields no commits.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::git::{GitHistory, DEFAULT_GREP};
    /// # async fn run() {
    /// let raw = GitHistory::new().fetch(DEFAULT_GREP, Some("v1.0.0")).await;
    /// # }
    /// ```
    pub async fn fetch(&self, grep: &str, from: Option<&str>) -> Vec<RawCommit> {
        let range = match from {
            Some(from) => format!("{from}..HEAD"),
            None => "HEAD".to_owned(),
        };
        debug!("Running git log for {range} with grep {grep:?}");

        let output = self
            .command()
            .arg("log")
            .arg("-E")
            .arg(format!("--grep={grep}"))
            .arg(format!("--format={LOG_FORMAT}"))
            .arg(&range)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => split_log(&String::from_utf8_lossy(&out.stdout)),
            Ok(out) => {
                warn!(
                    "git log {range} failed: {}",
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Vec::new()
            }
            Err(e) => {
                warn!("failed to run git log: {e}");
                Vec::new()
            }
        }
    }

    /// Retrieves the most recent tag reachable from `HEAD`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::git::GitHistory;
    /// # async fn run() {
    /// let tag = GitHistory::new().previous_tag().await.unwrap();
    /// # }
    /// ```
    pub async fn previous_tag(&self) -> Result<String> {
        let output = self
            .command()
            .args(["describe", "--tags", "--abbrev=0"])
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::TagLookup(
                String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}
