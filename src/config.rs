use std::path::PathBuf;

use serde::Deserialize;

use crate::{fmt::ChangelogFormat, link_style::LinkStyle};

/// The contents of a `.chlog.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCfg {
    #[serde(default)]
    pub chlog: RawChlogCfg,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawChlogCfg {
    pub repository: Option<String>,
    pub bugs: Option<String>,
    pub link_style: Option<LinkStyle>,
    pub output_format: ChangelogFormat,
    pub outfile: Option<String>,
    pub prepend: bool,
    pub grep: Option<String>,
    pub git_dir: Option<PathBuf>,
    pub git_work_tree: Option<PathBuf>,
}

/// The fields of a `package.json` describing where a project lives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageMeta {
    #[serde(default)]
    pub repository: Option<UrlField>,
    #[serde(default)]
    pub bugs: Option<UrlField>,
}

/// npm allows both `"repository": "owner/repo"` and
/// `"repository": { "type": "git", "url": "..." }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlField {
    Url(String),
    Object { url: Option<String> },
}

impl UrlField {
    pub fn url(&self) -> Option<&str> {
        match self {
            UrlField::Url(url) => Some(url),
            UrlField::Object { url } => url.as_deref(),
        }
    }
}

impl PackageMeta {
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_ref().and_then(UrlField::url)
    }

    pub fn bugs(&self) -> Option<&str> {
        self.bugs.as_ref().and_then(UrlField::url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config() {
        let cfg = r#"
            [chlog]
            repository = "bitbucket:owner/repo"
            bugs = "https://tracker.example.com/browse"
            link-style = "Bitbucket"
            output-format = "json"
            outfile = "MyChangelog.md"
            prepend = true
            grep = "^fix|BREAKING"
            git-work-tree = "/myproject"
            git-dir = "/myproject/.git"
        "#;
        let res = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg: RawCfg = res.unwrap();

        assert_eq!(cfg.chlog.repository, Some("bitbucket:owner/repo".into()));
        assert_eq!(
            cfg.chlog.bugs,
            Some("https://tracker.example.com/browse".into())
        );
        assert_eq!(cfg.chlog.link_style, Some(LinkStyle::Bitbucket));
        assert_eq!(cfg.chlog.output_format, ChangelogFormat::Json);
        assert_eq!(cfg.chlog.outfile, Some("MyChangelog.md".into()));
        assert!(cfg.chlog.prepend);
        assert_eq!(cfg.chlog.grep, Some("^fix|BREAKING".into()));
        assert_eq!(cfg.chlog.git_work_tree, Some("/myproject".into()));
        assert_eq!(cfg.chlog.git_dir, Some("/myproject/.git".into()));
    }

    #[test]
    fn empty_config() {
        let cfg: RawCfg = toml::from_str("").unwrap();
        assert_eq!(cfg.chlog.repository, None);
        assert_eq!(cfg.chlog.link_style, None);
        assert_eq!(cfg.chlog.output_format, ChangelogFormat::Markdown);
        assert!(!cfg.chlog.prepend);
    }

    #[test]
    fn bad_link_style() {
        let res: Result<RawCfg, _> = toml::from_str("[chlog]\nlink-style = \"svn\"");
        assert!(res.is_err());
    }

    #[test]
    fn dogfood_config() {
        let cfg = include_str!("../.chlog.toml");
        let res = toml::from_str(cfg);
        assert!(res.is_ok(), "{res:?}");
        let cfg: RawCfg = res.unwrap();

        assert_eq!(cfg.chlog.repository, Some("clog-tool/chlog".into()));
        assert_eq!(cfg.chlog.link_style, Some(LinkStyle::Github));
        assert_eq!(cfg.chlog.outfile, Some("CHANGELOG.md".into()));
    }

    #[test]
    fn package_json_strings() {
        let pkg: PackageMeta = serde_json::from_str(
            r#"{
                "name": "x",
                "repository": "owner/repo",
                "bugs": "https://github.com/owner/repo/issues"
            }"#,
        )
        .unwrap();
        assert_eq!(pkg.repository(), Some("owner/repo"));
        assert_eq!(pkg.bugs(), Some("https://github.com/owner/repo/issues"));
    }

    #[test]
    fn package_json_objects() {
        let pkg: PackageMeta = serde_json::from_str(
            r#"{
                "repository": {"type": "git", "url": "https://github.com/owner/repo"},
                "bugs": {"email": "bugs@example.com"}
            }"#,
        )
        .unwrap();
        assert_eq!(pkg.repository(), Some("https://github.com/owner/repo"));
        assert_eq!(pkg.bugs(), None);

        let pkg: PackageMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(pkg.repository(), None);
    }
}
