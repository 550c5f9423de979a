use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregate controls derived from the selection: the counter badge and
/// the enabled state of the build button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SelectionControls {
    pub count: usize,
    pub build_enabled: bool,
}

/// Article ids staged for the newspaper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str, is_selected: bool) -> SelectionControls {
        if is_selected {
            self.ids.insert(id.to_string());
        } else {
            self.ids.remove(id);
        }
        self.controls()
    }

    pub fn clear(&mut self) -> SelectionControls {
        self.ids.clear();
        self.controls()
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn controls(&self) -> SelectionControls {
        SelectionControls {
            count: self.size(),
            build_enabled: self.size() > 0,
        }
    }
}
