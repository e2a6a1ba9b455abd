use serde::{Deserialize, Serialize};

use crate::filter::{Filter, FilterSet};
use crate::item::{Item, ItemKind};

/// Which user actions a browsing session permits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfiguration {
    pub can_share_files: bool,
    pub can_remove_files: bool,
    pub can_remove_directories: bool,
    pub can_choose_files: bool,
    pub can_choose_directories: bool,
    pub allows_multiple_selection: bool,
    /// Activating a file outside edit mode chooses it immediately
    pub direct_selection: bool,
}

impl ActionsConfiguration {
    pub fn can_remove(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::File => self.can_remove_files,
            ItemKind::Directory => self.can_remove_directories,
        }
    }

    pub fn can_choose(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::File => self.can_choose_files,
            ItemKind::Directory => self.can_choose_directories,
        }
    }
}

/// Which entries a browsing session shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfiguration {
    /// Entries matching any of these are shown; empty shows everything
    pub include_filters: Vec<Filter>,
    /// Entries matching any of these are hidden
    pub exclude_filters: Vec<Filter>,
}

impl FilteringConfiguration {
    pub fn admits(&self, item: &Item) -> bool {
        self.include_filters.includes(item) && !self.exclude_filters.excludes(item)
    }
}

/// Per-session configuration, passed down unchanged to every screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub actions: ActionsConfiguration,
    pub filtering: FilteringConfiguration,
}
