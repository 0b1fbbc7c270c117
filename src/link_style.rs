use std::{result::Result as StdResult, str::FromStr};

use strum::{Display, EnumString};
use url::Url;

/// The link target used when a repository has no usable web URL
pub const NO_LINK: &str = "#";

/// Determines the hyperlink style used in commit and issue links. Defaults to
/// `LinkStyle::Github`
///
/// # Example
///
/// ```no_run
/// # use chlog::{Chlog, LinkStyle};
/// let chlog = Chlog::new().unwrap().link_style(LinkStyle::Gitlab);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum LinkStyle {
    #[default]
    Github,
    Gitlab,
    Bitbucket,
    Stash,
    Cgit,
    Gitweb,
}

impl<'de> serde::de::Deserialize<'de> for LinkStyle {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl LinkStyle {
    /// The style matching the host a repository spec points at, used when no
    /// style was configured. `bitbucket:` shorthand gets
    /// `LinkStyle::Bitbucket`, everything else the default.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let style = LinkStyle::for_repository(Some("bitbucket:owner/repo"));
    /// assert_eq!(style, LinkStyle::Bitbucket);
    /// assert_eq!(LinkStyle::for_repository(Some("owner/repo")), LinkStyle::Github);
    /// ```
    pub fn for_repository(spec: Option<&str>) -> LinkStyle {
        match spec.map(str::trim) {
            Some(s) if s.starts_with("bitbucket:") => LinkStyle::Bitbucket,
            _ => LinkStyle::default(),
        }
    }

    /// Gets a hyperlink url to an issue in the specified format, if the
    /// hosting software has an issue tracker.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let link = LinkStyle::Github;
    /// let issue = link.issue_url(141, "https://github.com/thoughtram/clog");
    ///
    /// assert_eq!(Some("https://github.com/thoughtram/clog/issues/141".to_owned()), issue);
    /// ```
    pub fn issue_url(&self, issue: u32, repo: &str) -> Option<String> {
        match repo.trim_end_matches('/') {
            "" | NO_LINK => None,
            link => match *self {
                LinkStyle::Github | LinkStyle::Bitbucket => {
                    Some(format!("{link}/issues/{issue}"))
                }
                LinkStyle::Gitlab => Some(format!("{link}/-/issues/{issue}")),
                // stash, cgit and gitweb do not support issues
                LinkStyle::Stash | LinkStyle::Cgit | LinkStyle::Gitweb => None,
            },
        }
    }

    /// Gets a hyperlink url to a commit in the specified format.
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let link = LinkStyle::Github;
    /// let commit = link.commit_url("123abc8912", "https://github.com/thoughtram/clog");
    ///
    /// assert_eq!("https://github.com/thoughtram/clog/commit/123abc8912", commit);
    /// ```
    ///
    /// # Example
    /// Note that for `LinkStyle::Gitweb` the actual repository name has to be
    /// given as part of the parameter string of the URL:
    ///
    /// ```
    /// # use chlog::LinkStyle;
    /// let link = LinkStyle::Gitweb;
    /// let commit = link.commit_url("deadbeef", "http://example.com/gitweb/?p=foo.git");
    ///
    /// assert_eq!("http://example.com/gitweb/?p=foo.git;a=commit;h=deadbeef", commit);
    /// ```
    pub fn commit_url(&self, hash: &str, repo: &str) -> String {
        match repo.trim_end_matches('/') {
            "" | NO_LINK => NO_LINK.to_owned(),
            link => match *self {
                LinkStyle::Github => format!("{link}/commit/{hash}"),
                LinkStyle::Gitlab => format!("{link}/-/commit/{hash}"),
                LinkStyle::Bitbucket | LinkStyle::Stash => format!("{link}/commits/{hash}"),
                LinkStyle::Cgit => format!("{link}/commit/?id={hash}"),
                LinkStyle::Gitweb => format!("{link};a=commit;h={hash}"),
            },
        }
    }
}

/// Turns the repository field of the project metadata into a web URL.
///
/// * nothing, or a `gist:` spec: `#`
/// * `bitbucket:owner/repo`: `https://bitbucket.org/owner/repo`
/// * an absolute URL: unchanged
/// * anything else is taken as GitHub shorthand: `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// # use chlog::repository_link;
/// assert_eq!(repository_link(Some("clog-tool/chlog")), "https://github.com/clog-tool/chlog");
/// assert_eq!(repository_link(None), "#");
/// ```
pub fn repository_link(spec: Option<&str>) -> String {
    let spec = match spec.map(str::trim) {
        None | Some("") => return NO_LINK.to_owned(),
        Some(s) => s,
    };

    if spec.starts_with("gist:") {
        NO_LINK.to_owned()
    } else if let Some(rest) = spec.strip_prefix("bitbucket:") {
        format!("https://bitbucket.org/{rest}")
    } else if is_url(spec) {
        spec.to_owned()
    } else {
        format!("https://github.com/{spec}")
    }
}

fn is_url(s: &str) -> bool {
    Url::parse(s).map_or(false, |u| u.has_host())
}

/// Display text of a commit link
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

/// Builds the Markdown links for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    /// The web URL of the repository, `#` if there is none
    pub repository: String,
    /// The bug tracker base URL, issue numbers are appended to it
    pub bugs: Option<String>,
    pub style: LinkStyle,
}

impl Default for Links {
    fn default() -> Self {
        Links {
            repository: NO_LINK.to_owned(),
            bugs: None,
            style: LinkStyle::default(),
        }
    }
}

impl Links {
    /// `repository` accepts everything [`repository_link`] does.
    pub fn new(repository: Option<&str>, bugs: Option<&str>, style: LinkStyle) -> Self {
        Links {
            repository: repository_link(repository),
            bugs: bugs
                .map(|b| b.trim().trim_end_matches('/'))
                .filter(|b| !b.is_empty())
                .map(str::to_owned),
            style,
        }
    }

    pub fn commit_url(&self, hash: &str) -> String {
        self.style.commit_url(hash, &self.repository)
    }

    pub fn issue_url(&self, issue: u32) -> Option<String> {
        match self.bugs {
            Some(ref bugs) => Some(format!("{bugs}/{issue}")),
            None => self.style.issue_url(issue, &self.repository),
        }
    }

    /// `[0123abcd](<commit url>)`
    pub fn commit_link(&self, hash: &str) -> String {
        format!("[{}]({})", short_hash(hash), self.commit_url(hash))
    }

    /// `[#42](<issue url>)`, or a plain `#42` without an issue tracker
    pub fn issue_link(&self, issue: u32) -> String {
        match self.issue_url(issue) {
            Some(url) => format!("[#{issue}]({url})"),
            None => format!("#{issue}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "deadbeefcafe0123456789abcdef0123456789ab";

    #[test]
    fn repository_link_missing() {
        assert_eq!(repository_link(None), "#");
        assert_eq!(repository_link(Some("")), "#");
        assert_eq!(repository_link(None), repository_link(Some("  ")));
    }

    #[test]
    fn repository_link_shorthand() {
        assert_eq!(
            repository_link(Some("username/repo")),
            "https://github.com/username/repo"
        );
    }

    #[test]
    fn repository_link_absolute_urls() {
        assert_eq!(
            repository_link(Some("http://example.com/username/repo")),
            "http://example.com/username/repo"
        );
        assert_eq!(
            repository_link(Some("https://example.com/username/repo")),
            "https://example.com/username/repo"
        );
    }

    #[test]
    fn repository_link_gist() {
        assert_eq!(repository_link(Some("gist:11081aaa281")), "#");
        assert_eq!(repository_link(Some("gist:https://example.com")), "#");
    }

    #[test]
    fn repository_link_bitbucket() {
        assert_eq!(
            repository_link(Some("bitbucket:username/repo")),
            "https://bitbucket.org/username/repo"
        );
    }

    #[test]
    fn repository_link_unknown_scheme_is_shorthand() {
        assert_eq!(
            repository_link(Some("gitlab:username/repo")),
            "https://github.com/gitlab:username/repo"
        );
    }

    #[test]
    fn link_style_from_str() {
        assert_eq!("github".parse::<LinkStyle>().unwrap(), LinkStyle::Github);
        assert_eq!("GitLab".parse::<LinkStyle>().unwrap(), LinkStyle::Gitlab);
        assert!("sourceforge".parse::<LinkStyle>().is_err());
        assert_eq!(LinkStyle::Cgit.to_string(), "cgit");
    }

    #[test]
    fn test_gitweb_commit_link() {
        let link = LinkStyle::Gitweb;
        let hash = "deadbeef";
        let commit = link.commit_url(hash, "http://example.com/gitweb/?p=foo.git");
        assert_eq!(
            format!("http://example.com/gitweb/?p=foo.git;a=commit;h={}", &hash),
            commit
        );
    }

    #[test]
    fn style_for_repository() {
        assert_eq!(
            LinkStyle::for_repository(Some("bitbucket:owner/repo")),
            LinkStyle::Bitbucket
        );
        assert_eq!(
            LinkStyle::for_repository(Some("https://bitbucket.org/owner/repo")),
            LinkStyle::Github
        );
        assert_eq!(LinkStyle::for_repository(Some("owner/repo")), LinkStyle::Github);
        assert_eq!(LinkStyle::for_repository(None), LinkStyle::Github);

        let spec = Some("bitbucket:owner/repo");
        let links = Links::new(spec, None, LinkStyle::for_repository(spec));
        assert_eq!(
            links.commit_link(HASH),
            format!("[deadbeef](https://bitbucket.org/owner/repo/commits/{HASH})")
        );
    }

    #[test]
    fn test_gitweb_issue_link() {
        let link = LinkStyle::Gitweb;
        let issue = link.issue_url(42, "http://example.com/gitweb/?p=foo.git");
        assert_eq!(None, issue);
    }

    #[test]
    fn commit_link_markdown() {
        let links = Links::new(Some("owner/repo"), None, LinkStyle::Github);
        assert_eq!(
            links.commit_link(HASH),
            format!("[deadbeef](https://github.com/owner/repo/commit/{HASH})")
        );
    }

    #[test]
    fn commit_link_without_repository() {
        let links = Links::new(Some("gist:123"), None, LinkStyle::Github);
        assert_eq!(links.commit_link(HASH), "[deadbeef](#)");
        assert_eq!(links.commit_link("abc"), "[abc](#)");
    }

    #[test]
    fn issue_link_uses_bug_tracker() {
        let links = Links::new(
            Some("owner/repo"),
            Some("https://tracker.example.com/browse/"),
            LinkStyle::Github,
        );
        assert_eq!(
            links.issue_link(42),
            "[#42](https://tracker.example.com/browse/42)"
        );
    }

    #[test]
    fn issue_link_falls_back_to_link_style() {
        let links = Links::new(Some("owner/repo"), None, LinkStyle::Github);
        assert_eq!(
            links.issue_link(7),
            "[#7](https://github.com/owner/repo/issues/7)"
        );

        let links = Links::new(Some("https://git.example.com/repo"), None, LinkStyle::Cgit);
        assert_eq!(links.issue_link(7), "#7");
        assert_eq!(Links::default().issue_link(7), "#7");
    }
}
