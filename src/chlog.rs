use std::{
    env, fs,
    fs::File,
    io::{self, stdout, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    config::{PackageMeta, RawCfg},
    error::{Error, Result},
    fmt::{ChangelogFormat, FormatWriter, JsonWriter, MarkdownWriter, Release},
    git::{Commits, GitHistory, RawCommit, DEFAULT_GREP},
    link_style::{LinkStyle, Links},
    parser::CommitParser,
    sectionmap::SectionMap,
    DEFAULT_CONFIG_FILE, PACKAGE_FILE,
};

/// The base struct used to set options and interact with the library.
#[derive(Debug, Clone)]
pub struct Chlog {
    /// The grep search pattern used to find commits we are interested in
    /// (Defaults to: "^fix|^feat|^perf|BREAKING")
    pub grep: String,
    /// The repository used for the base of hyper-links, anything
    /// `repository_link` understands
    pub repo: Option<String>,
    /// The base URL of the bug tracker, issue numbers get appended
    pub bugs: Option<String>,
    /// The link style to used for commit and issue hyper-links. When unset it
    /// follows the repository, see `LinkStyle::for_repository`
    pub link_style: Option<LinkStyle>,
    /// The version for the release header (Defaults to "Unreleased")
    pub version: Option<String>,
    /// Where to start looking for commits. When unset the most recent tag is
    /// used
    pub from: Option<String>,
    /// Use the whole history instead of looking up the previous tag
    pub first_release: bool,
    /// The file to use as the changelog output file (Defaults to `stdout`)
    pub outfile: Option<PathBuf>,
    /// Keep what `outfile` held before, below the new release
    pub prepend: bool,
    /// The format to output the changelog in (Defaults to Markdown)
    pub out_format: ChangelogFormat,
    /// Where `git` gets run
    pub history: GitHistory,
    pub parser: CommitParser,
}

impl Default for Chlog {
    fn default() -> Self {
        debug!("Creating default chlog with Chlog::default()");
        Chlog {
            grep: DEFAULT_GREP.to_owned(),
            repo: None,
            bugs: None,
            link_style: None,
            version: None,
            from: None,
            first_release: false,
            outfile: None,
            prepend: false,
            out_format: ChangelogFormat::default(),
            history: GitHistory::new(),
            parser: CommitParser::new(),
        }
    }
}

impl Chlog {
    /// Creates a default `Chlog` struct for the repository `git` finds from
    /// the current working directory, reading `.chlog.toml` (or, failing
    /// that, `package.json`) from the current directory if present.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        debug!("Creating default chlog with new()");
        let cwd = env::current_dir().map_err(|_| Error::CurrentDir)?;
        Chlog::default().try_project_files(&cwd)
    }

    /// Creates a `Chlog` struct using a specific git working directory OR
    /// `.git` directory. Reads `.chlog.toml` (or, failing that,
    /// `package.json`) from the working directory if present.
    ///
    /// **NOTE:** If you specify a `.git` folder the parent will be used as the
    /// working tree, and vice versa.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::with_dir("/myproject").unwrap();
    /// ```
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        debug!("Creating chlog with \n\tdir: {:?}", dir.as_ref());
        let history = GitHistory::with_dir(dir);
        let work_tree = history.work_tree.clone().unwrap_or_default();
        let chlog = Chlog {
            history,
            ..Chlog::default()
        };
        chlog.try_project_files(&work_tree)
    }

    /// Creates a `Chlog` struct from a custom named TOML configuration file,
    /// which has to exist. Relative paths inside the configuration resolve
    /// against the current directory, as they do for `git`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::from_file("/myproject/chlog_conf.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        debug!("Creating chlog with \n\tfile: {:?}", file.as_ref());
        Chlog::default().try_config_file(file.as_ref())
    }

    fn try_project_files(self, dir: &Path) -> Result<Self> {
        let cfg_file = dir.join(DEFAULT_CONFIG_FILE);
        let pkg_file = dir.join(PACKAGE_FILE);
        if cfg_file.is_file() {
            self.try_config_file(&cfg_file)
        } else if pkg_file.is_file() {
            self.try_package_file(&pkg_file)
        } else {
            debug!("No project files found in {:?}", dir);
            Ok(self)
        }
    }

    // Try and apply a config file
    fn try_config_file(mut self, cfg_file: &Path) -> Result<Self> {
        debug!("Trying to use config file: {:?}", cfg_file);
        let toml_s = fs::read_to_string(cfg_file)?;
        let cfg: RawCfg = toml::from_str(&toml_s).map_err(|source| Error::ConfigParse {
            path: cfg_file.to_path_buf(),
            source,
        })?;
        let cfg = cfg.chlog;

        if cfg.repository.is_some() {
            self.repo = cfg.repository;
        }
        if cfg.bugs.is_some() {
            self.bugs = cfg.bugs;
        }
        if let Some(grep) = cfg.grep {
            self.grep = grep;
        }
        if let Some(outfile) = cfg.outfile {
            self.outfile = Some(PathBuf::from(outfile));
        }
        if let Some(dir) = cfg.git_dir {
            self.history.git_dir = Some(dir);
        }
        if let Some(dir) = cfg.git_work_tree {
            self.history.work_tree = Some(dir);
        }
        if cfg.link_style.is_some() {
            self.link_style = cfg.link_style;
        }
        self.out_format = cfg.output_format;
        self.prepend = cfg.prepend;

        debug!("Returning chlog:\n{:?}", self);
        Ok(self)
    }

    // Try and take the repository and bug tracker from npm metadata
    fn try_package_file(mut self, pkg_file: &Path) -> Result<Self> {
        debug!("Trying to use package file: {:?}", pkg_file);
        let json_s = fs::read_to_string(pkg_file)?;
        let pkg: PackageMeta =
            serde_json::from_str(&json_s).map_err(|source| Error::PackageParse {
                path: pkg_file.to_path_buf(),
                source,
            })?;

        self.repo = pkg.repository().map(str::to_owned);
        self.bugs = pkg.bugs().map(str::to_owned);

        debug!("Returning chlog:\n{:?}", self);
        Ok(self)
    }

    /// Sets the grep search pattern for finding commits.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new().unwrap().grep("^fix|BREAKING");
    /// ```
    pub fn grep<S: Into<String>>(mut self, g: S) -> Chlog {
        self.grep = g.into();
        self
    }

    /// Sets the repository used for the base of hyper-links, either a URL or
    /// a shorthand such as `owner/repo` or `bitbucket:owner/repo`
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new().unwrap().repository("clog-tool/chlog");
    /// ```
    pub fn repository<S: Into<String>>(mut self, r: S) -> Chlog {
        self.repo = Some(r.into());
        self
    }

    /// Sets the bug tracker base URL
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new()
    ///     .unwrap()
    ///     .bugs("https://github.com/clog-tool/chlog/issues");
    /// ```
    pub fn bugs<S: Into<String>>(mut self, b: S) -> Chlog {
        self.bugs = Some(b.into());
        self
    }

    /// Sets the link style to use for hyper-links
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// file
    pub fn link_style(mut self, l: LinkStyle) -> Chlog {
        self.link_style = Some(l);
        self
    }

    /// Sets the version for the release
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new().unwrap().version("v0.2.1-beta3");
    /// ```
    pub fn version<S: Into<String>>(mut self, v: S) -> Chlog {
        self.version = Some(v.into());
        self
    }

    /// Sets how far back to begin searching commits using a tag, hash or short
    /// hash, instead of the most recent tag
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// let chlog = Chlog::new().unwrap().from("6d8183f");
    /// ```
    pub fn from<S: Into<String>>(mut self, f: S) -> Chlog {
        self.from = Some(f.into());
        self
    }

    /// Sets whether this is the first release, i.e. the whole history is
    /// used and no tag is looked up
    pub fn first_release(mut self, f: bool) -> Chlog {
        self.first_release = f;
        self
    }

    /// Sets the changelog output file (Defaults to `stdout` if omitted)
    ///
    /// **NOTE:** Anything set here will override anything in a configuration
    /// file
    pub fn outfile<P: AsRef<Path>>(mut self, o: P) -> Chlog {
        self.outfile = Some(o.as_ref().to_path_buf());
        self
    }

    /// Sets whether the previous contents of the output file are kept below
    /// the new release
    pub fn prepend(mut self, p: bool) -> Chlog {
        self.prepend = p;
        self
    }

    /// The format of output for the changelog (Defaults to Markdown)
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::{fmt::ChangelogFormat, Chlog};
    /// let chlog = Chlog::new().unwrap().output_format(ChangelogFormat::Json);
    /// ```
    pub fn output_format(mut self, f: ChangelogFormat) -> Chlog {
        self.out_format = f;
        self
    }

    /// Sets the `git` metadata directory (typically `.git` child of your
    /// project working tree)
    pub fn git_dir<P: AsRef<Path>>(mut self, d: P) -> Chlog {
        self.history = self.history.git_dir(d);
        self
    }

    /// Sets the `git` working tree directory (typically your project directory)
    pub fn git_work_tree<P: AsRef<Path>>(mut self, d: P) -> Chlog {
        self.history = self.history.work_tree(d);
        self
    }

    /// The links built from the repository, bug tracker and link style
    pub fn links(&self) -> Links {
        let repo = self.repo.as_deref();
        let style = self
            .link_style
            .unwrap_or_else(|| LinkStyle::for_repository(repo));
        Links::new(repo, self.bugs.as_deref(), style)
    }

    /// The release header, dated today
    pub fn release(&self) -> Result<Release> {
        Release::today(self.version.as_deref().unwrap_or("Unreleased"))
    }

    /// The revision commits are collected after: `from` if set, nothing for a
    /// first release, the most recent tag otherwise.
    pub async fn lower_bound(&self) -> Result<Option<String>> {
        if let Some(ref from) = self.from {
            return Ok(Some(from.clone()));
        }
        if self.first_release {
            info!("Reading the whole git log");
            return Ok(None);
        }

        let tag = self.history.previous_tag().await?;
        info!("Reading git log since {tag}");
        Ok(Some(tag))
    }

    /// Retrieves a `Vec<Commit>` of only commits we care about.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// # async fn run() {
    /// let chlog = Chlog::new().unwrap();
    /// let commits = chlog.get_commits().await.unwrap();
    /// # }
    /// ```
    pub async fn get_commits(&self) -> Result<Commits> {
        let from = self.lower_bound().await?;
        let raw = self.history.fetch(&self.grep, from.as_deref()).await;
        let commits = self.parse_raw_commits(&raw);
        info!("Parsed {} commits", commits.len());
        Ok(commits)
    }

    /// Parses raw commits, dropping the malformed ones
    pub fn parse_raw_commits(&self, raw: &[RawCommit]) -> Commits {
        raw.iter().filter_map(|r| self.parser.parse(r)).collect()
    }

    /// Collects the commits and writes the changelog using whatever options
    /// have been specified thus far. Nothing is written when collecting the
    /// commits fails.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::Chlog;
    /// # async fn run() {
    /// let chlog = Chlog::new().unwrap().version("1.2.0");
    /// chlog.generate().await.unwrap();
    /// # }
    /// ```
    pub async fn generate(&self) -> Result<()> {
        let release = self.release()?;
        let sm = SectionMap::from_commits(self.get_commits().await?);
        self.write_changelog(&release, &sm)
    }

    /// Writes a section map to `outfile`, or `stdout` if there is none
    pub fn write_changelog(&self, release: &Release, sm: &SectionMap) -> Result<()> {
        debug!("Writing changelog with preset options");
        if let Some(ref cl) = self.outfile {
            debug!("outfile set to: {:?}", cl);
            self.write_changelog_to(cl, release, sm)
        } else {
            debug!("outfile not set using stdout");
            if self.prepend {
                warn!("prepend is ignored without an output file");
            }
            info!("Generating changelog to stdout ({})", release.version);
            let out = stdout();
            let mut out_buf = BufWriter::new(out.lock());
            self.write_changelog_with(&mut out_buf, release, sm)
        }
    }

    /// Writes the changelog to a specified file, keeping the previous
    /// contents below it when `prepend` is set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use chlog::{Chlog, SectionMap};
    /// let chlog = Chlog::new().unwrap().prepend(true);
    /// let release = chlog.release().unwrap();
    ///
    /// chlog
    ///     .write_changelog_to("/myproject/CHANGELOG.md", &release, &SectionMap::default())
    ///     .unwrap();
    /// ```
    pub fn write_changelog_to<P: AsRef<Path>>(
        &self,
        cl: P,
        release: &Release,
        sm: &SectionMap,
    ) -> Result<()> {
        debug!("Writing changelog to file: {:?}", cl.as_ref());
        info!(
            "Generating changelog to {} ({})",
            cl.as_ref().display(),
            release.version
        );

        let previous = if self.prepend && self.out_format == ChangelogFormat::Json {
            warn!("prepend is ignored for JSON output");
            String::new()
        } else if self.prepend {
            match fs::read_to_string(cl.as_ref()) {
                Ok(contents) => contents,
                Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e.into()),
            }
        } else {
            String::new()
        };

        let mut file = BufWriter::new(File::create(cl.as_ref())?);
        self.write_changelog_with(&mut file, release, sm)?;
        if !previous.is_empty() {
            writeln!(file)?;
            file.write_all(previous.as_bytes())?;
        }
        file.flush()?;

        Ok(())
    }

    /// Writes a changelog to any `std::io::Write` with the configured
    /// `FormatWriter`
    ///
    /// # Examples
    ///
    /// ```
    /// # use chlog::{Chlog, SectionMap, fmt::Release};
    /// let chlog = Chlog::default();
    /// let mut out = Vec::new();
    ///
    /// chlog
    ///     .write_changelog_with(
    ///         &mut out,
    ///         &Release::new("1.0.0", "2024-01-01"),
    ///         &SectionMap::default(),
    ///     )
    ///     .unwrap();
    /// assert_eq!(String::from_utf8(out).unwrap(), "# 1.0.0 (2024-01-01)\n");
    /// ```
    pub fn write_changelog_with<T: Write>(
        &self,
        out: &mut T,
        release: &Release,
        sm: &SectionMap,
    ) -> Result<()> {
        debug!("Writing changelog from writer");
        match self.out_format {
            ChangelogFormat::Markdown => {
                MarkdownWriter::new(out, self.links()).write_changelog(release, sm)
            }
            ChangelogFormat::Json => {
                JsonWriter::new(out, self.links()).write_changelog(release, sm)
            }
        }
    }
}
