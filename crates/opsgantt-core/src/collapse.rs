//! Per-id collapse flags. Absent ids are expanded.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseState {
    entries: HashMap<String, bool>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Insert unseen ids as expanded; existing flags are left alone.
    /// Returns how many ids were new.
    pub fn seed<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for id in ids {
            if !self.entries.contains_key(id) {
                self.entries.insert(id.to_string(), false);
                added += 1;
            }
        }
        added
    }

    /// Flip one id and return its new value
    pub fn toggle(&mut self, id: &str) -> bool {
        let flag = self.entries.entry(id.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn set(&mut self, id: &str, collapsed: bool) {
        self.entries.insert(id.to_string(), collapsed);
    }

    pub fn expand_all(&mut self) {
        self.entries.values_mut().for_each(|v| *v = false);
    }

    pub fn collapse_all(&mut self) {
        self.entries.values_mut().for_each(|v| *v = true);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids currently collapsed, sorted
    pub fn collapsed_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, collapsed)| **collapsed)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
