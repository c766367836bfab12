use crate::domain::model::Collection;
use std::collections::HashSet;

/// Include / exclude rules for picking collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSelection {
    pub include: HashSet<String>,
    pub exclude: HashSet<String>,
    pub include_system: bool,
}

impl CollectionSelection {
    pub fn from_lists<S: AsRef<str>>(include: &[S], exclude: &[S], include_system: bool) -> Self {
        Self {
            include: normalize(include),
            exclude: normalize(exclude),
            include_system,
        }
    }

    /// Name rules only; an empty include list admits everything.
    pub fn allows_name(&self, name: &str) -> bool {
        (self.include.is_empty() || self.include.contains(name)) && !self.exclude.contains(name)
    }

    /// Collections to export, sorted by name.
    pub fn select(&self, collections: Vec<Collection>) -> Vec<Collection> {
        let mut selected: Vec<Collection> = collections
            .into_iter()
            .filter(|c| !c.name.is_empty())
            .filter(|c| self.allows_name(&c.name))
            .filter(|c| self.include_system || !c.system)
            .collect();
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        selected
    }
}

/// Splits a comma-separated list, trimming names and dropping empty ones.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize<S: AsRef<str>>(names: &[S]) -> HashSet<String> {
    names
        .iter()
        .map(|n| n.as_ref().trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}
