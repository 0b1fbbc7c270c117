use std::path::PathBuf;

use chlog::{error::Result, fmt::ChangelogFormat, Chlog, LinkStyle};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate a Markdown changelog from the commits since the previous tag
#[derive(Debug, Parser)]
#[command(name = "chlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Version placed in the release header
    #[arg(value_name = "VERSION")]
    release_version: String,

    /// Write the changelog here instead of stdout
    #[arg(value_name = "OUTFILE")]
    outfile: Option<PathBuf>,

    /// Configuration file (default: .chlog.toml, falling back to package.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Collect commits after this revision instead of the previous tag
    #[arg(long, value_name = "REV", conflicts_with = "first_release")]
    from: Option<String>,

    /// Collect the whole history, for a project without tags
    #[arg(long)]
    first_release: bool,

    /// Repository URL or shorthand (owner/repo, bitbucket:owner/repo)
    #[arg(long, value_name = "SPEC")]
    repository: Option<String>,

    /// Bug tracker base URL, issue numbers are appended to it
    #[arg(long, value_name = "URL")]
    bugs: Option<String>,

    /// Link style: github, gitlab, bitbucket, stash, cgit or gitweb
    #[arg(long, value_name = "STYLE")]
    link_style: Option<LinkStyle>,

    /// Output format: markdown or json
    #[arg(long, value_name = "FORMAT")]
    format: Option<ChangelogFormat>,

    /// Keep the previous contents of OUTFILE below the new release
    #[arg(long, overrides_with = "no_prepend")]
    prepend: bool,

    /// Overwrite OUTFILE even if the configuration asks to prepend
    #[arg(long, overrides_with = "prepend")]
    no_prepend: bool,

    /// The .git directory of the repository
    #[arg(long, value_name = "DIR")]
    git_dir: Option<PathBuf>,

    /// The working tree of the repository
    #[arg(long, value_name = "DIR")]
    work_tree: Option<PathBuf>,
}

impl Cli {
    /// Configuration file first, then flags on top
    fn build(&self) -> Result<Chlog> {
        let mut builder = match (&self.config, &self.work_tree) {
            (Some(cfg), _) => Chlog::from_file(cfg)?,
            (None, Some(dir)) => Chlog::with_dir(dir)?,
            (None, None) => Chlog::new()?,
        };

        let prepend = !self.no_prepend && (builder.prepend || self.prepend);
        builder = builder
            .version(&self.release_version)
            .first_release(self.first_release)
            .prepend(prepend);

        if let Some(ref from) = self.from {
            builder = builder.from(from);
        }
        if let Some(ref outfile) = self.outfile {
            builder = builder.outfile(outfile);
        }
        if let Some(ref repo) = self.repository {
            builder = builder.repository(repo);
        }
        if let Some(ref bugs) = self.bugs {
            builder = builder.bugs(bugs);
        }
        if let Some(style) = self.link_style {
            builder = builder.link_style(style);
        }
        if let Some(format) = self.format {
            builder = builder.output_format(format);
        }
        if let Some(ref dir) = self.git_dir {
            builder = builder.git_dir(dir);
        }
        if let Some(ref dir) = self.work_tree {
            builder = builder.git_work_tree(dir);
        }

        Ok(builder)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    cli.build()?.generate().await?;

    Ok(())
}

/// Diagnostics go to stderr so they never end up in a changelog written to
/// stdout. Controlled by RUST_LOG (default: info).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
