use indexmap::IndexMap;
use strum::Display;

use crate::git::Commit;

/// The four fixed sections of a changelog, in the order they are written
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SectionKey {
    Fix,
    Feat,
    Perf,
    Breaks,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        SectionKey::Fix,
        SectionKey::Feat,
        SectionKey::Perf,
        SectionKey::Breaks,
    ];

    /// The section header
    pub fn title(&self) -> &'static str {
        match *self {
            SectionKey::Fix => "Bug Fixes",
            SectionKey::Feat => "Features",
            SectionKey::Perf => "Performance Improvements",
            SectionKey::Breaks => "Breaking Changes",
        }
    }

    /// The section a commit of type `commit_type` is listed under. Breaking
    /// changes are never picked by type.
    pub fn from_commit_type(commit_type: &str) -> Option<SectionKey> {
        match commit_type {
            "fix" => Some(SectionKey::Fix),
            "feat" => Some(SectionKey::Feat),
            "perf" => Some(SectionKey::Perf),
            _ => None,
        }
    }
}

/// A single line of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Commit(Commit),
    /// Generated for every commit with a `BREAKING CHANGE:` description
    BreakingChange { hash: String, description: String },
}

impl Entry {
    pub fn hash(&self) -> &str {
        match self {
            Entry::Commit(c) => &c.hash,
            Entry::BreakingChange { hash, .. } => hash,
        }
    }
}

/// The second level of the changelog, i.e. the components -> entries. `None`
/// holds the entries of commits without a component.
pub type ComponentMap = IndexMap<Option<String>, Vec<Entry>>;

/// A struct which holds sections to and components->entries map
#[derive(Debug, Clone)]
pub struct SectionMap {
    /// The top level map of the changelog, i.e. sections -> components
    pub sections: IndexMap<SectionKey, ComponentMap>,
}

impl Default for SectionMap {
    fn default() -> Self {
        SectionMap {
            sections: SectionKey::ALL
                .iter()
                .map(|&key| (key, ComponentMap::new()))
                .collect(),
        }
    }
}

impl SectionMap {
    /// Creates a section map from a vector of commits, which we can then
    /// iterate through and write
    ///
    /// # Example
    ///
    /// ```
    /// # use chlog::{CommitParser, SectionMap, SectionKey};
    /// let parser = CommitParser::new();
    /// let commits = ["0123456789abcdef0123456789abcdef01234567\nfix(core): handle null"]
    ///     .iter()
    ///     .filter_map(|raw| parser.parse_str(raw))
    ///     .collect();
    ///
    /// let sm = SectionMap::from_commits(commits);
    /// assert_eq!(sm.entry_count(SectionKey::Fix), 1);
    /// ```
    pub fn from_commits(commits: Vec<Commit>) -> SectionMap {
        let mut sm = SectionMap::default();

        for entry in commits {
            if let Some(ref description) = entry.breaking {
                sm.push(
                    SectionKey::Breaks,
                    entry.component.clone(),
                    Entry::BreakingChange {
                        hash: entry.hash.clone(),
                        description: description.clone(),
                    },
                );
            }
            if let Some(key) = SectionKey::from_commit_type(&entry.commit_type) {
                sm.push(key, entry.component.clone(), Entry::Commit(entry));
            }
        }

        sm
    }

    fn push(&mut self, key: SectionKey, component: Option<String>, entry: Entry) {
        self.sections
            .entry(key)
            .or_default()
            .entry(component)
            .or_default()
            .push(entry);
    }

    /// Number of entries in a section over all of its components
    pub fn entry_count(&self, key: SectionKey) -> usize {
        self.sections
            .get(&key)
            .map_or(0, |comps| comps.values().map(Vec::len).sum())
    }

    /// The non-empty components of a section, entries without a component
    /// first, then sorted by component name
    pub fn sorted_components(&self, key: SectionKey) -> Vec<(Option<&str>, &[Entry])> {
        let mut comps: Vec<_> = self
            .sections
            .get(&key)
            .into_iter()
            .flat_map(|comps| comps.iter())
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(comp, entries)| (comp.as_deref(), entries.as_slice()))
            .collect();
        comps.sort_by(|a, b| a.0.cmp(&b.0));
        comps
    }

    /// The sections with at least one entry, in writing order
    pub fn non_empty_sections(&self) -> impl Iterator<Item = SectionKey> + '_ {
        SectionKey::ALL
            .into_iter()
            .filter(move |&key| self.entry_count(key) > 0)
    }
}
