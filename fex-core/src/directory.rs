use std::rc::Rc;

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::broadcast::{RemovalBroadcast, Subscription};
use crate::config::Configuration;
use crate::item::{Item, LoadedItem};
use crate::service::{DeleteCompletion, FileService};

/// Display order of a directory listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Ascending by path
    #[default]
    Name,
    /// Most recently modified first
    Date,
}

impl SortMode {
    pub fn toggle(self) -> Self {
        match self {
            SortMode::Name => SortMode::Date,
            SortMode::Date => SortMode::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Name => "name",
            SortMode::Date => "date",
        }
    }
}

/// Notifications from a directory view-model to its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    /// The displayed items changed
    ItemsListChanged,
    /// Edit mode, selection or action availability changed
    StateChanged,
    /// An item was activated outside edit mode
    ItemActivated(Item),
    /// Items were picked directly, without going through edit mode
    ItemsChosen(Vec<Item>),
}

/// Browsing and selection state of one directory listing.
///
/// Two states: browsing (`is_editing() == false`) and selecting. Leaving
/// selecting always clears the selection. A pending deletion disables
/// interaction without being a state of its own.
pub struct DirectoryContentViewModel {
    directory: Item,
    configuration: Configuration,
    service: Rc<dyn FileService>,
    subscription: Subscription,
    events: Sender<DirectoryEvent>,
    all_items: Vec<Item>,
    items_to_display: Vec<Item>,
    selected_items: Vec<Item>,
    is_editing: bool,
    search_query: String,
    sort_mode: SortMode,
}

impl DirectoryContentViewModel {
    /// Build the view-model for a loaded directory and subscribe it to removals
    pub fn new(
        loaded: LoadedItem<Vec<Item>>,
        configuration: Configuration,
        service: Rc<dyn FileService>,
        broadcast: &RemovalBroadcast,
    ) -> (Self, Receiver<DirectoryEvent>) {
        let (events, rx) = crossbeam_channel::unbounded();
        let all_items = admitted(&configuration, loaded.resource);

        let mut view_model = Self {
            directory: loaded.item,
            configuration,
            service,
            subscription: broadcast.subscribe(),
            events,
            all_items,
            items_to_display: Vec::new(),
            selected_items: Vec::new(),
            is_editing: false,
            search_query: String::new(),
            sort_mode: SortMode::default(),
        };
        view_model.refresh_display();

        (view_model, rx)
    }

    pub fn directory(&self) -> &Item {
        &self.directory
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Last path component of the directory
    pub fn title(&self) -> String {
        self.directory.name()
    }

    /// Items in display order
    pub fn items(&self) -> &[Item] {
        &self.items_to_display
    }

    pub fn item_at(&self, index: usize) -> Option<&Item> {
        self.items_to_display.get(index)
    }

    pub fn selected_items(&self) -> &[Item] {
        &self.selected_items
    }

    /// Display positions of the selected items, ascending
    pub fn selected_display_indices(&self) -> Vec<usize> {
        self.items_to_display
            .iter()
            .enumerate()
            .filter(|(_, item)| self.selected_items.contains(item))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.item_at(index)
            .is_some_and(|item| self.selected_items.contains(item))
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.is_editing = editing;
        if !editing {
            self.selected_items.clear();
        }
        self.emit(DirectoryEvent::StateChanged);
    }

    /// In selecting, add the item to the selection. In browsing, report it
    /// as activated (or chosen, with direct selection of files).
    pub fn select_display_item(&mut self, index: usize) {
        let Some(item) = self.item_at(index).cloned() else {
            return;
        };

        if !self.is_editing {
            self.activate(item);
            return;
        }

        if !self.selected_items.contains(&item) {
            self.selected_items.push(item);
            self.emit(DirectoryEvent::StateChanged);
        }
    }

    /// In selecting, drop the item from the selection. In browsing, behaves
    /// like [`select_display_item`](Self::select_display_item).
    pub fn deselect_display_item(&mut self, index: usize) {
        let Some(item) = self.item_at(index).cloned() else {
            return;
        };

        if !self.is_editing {
            self.activate(item);
            return;
        }

        if let Some(position) = self.selected_items.iter().position(|s| *s == item) {
            self.selected_items.remove(position);
            self.emit(DirectoryEvent::StateChanged);
        }
    }

    fn activate(&self, item: Item) {
        let actions = &self.configuration.actions;
        if !item.is_directory() && actions.direct_selection && actions.can_choose_files {
            self.emit(DirectoryEvent::ItemsChosen(vec![item]));
        } else {
            self.emit(DirectoryEvent::ItemActivated(item));
        }
    }

    /// Select the item if it is not selected, deselect it otherwise
    pub fn toggle_display_item(&mut self, index: usize) {
        if self.is_selected(index) {
            self.deselect_display_item(index);
        } else {
            self.select_display_item(index);
        }
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.trim().to_string();
        self.refresh_display();
        self.emit(DirectoryEvent::ItemsListChanged);
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        self.refresh_display();
        self.emit(DirectoryEvent::ItemsListChanged);
    }

    /// Delete the items at the given display positions.
    ///
    /// Returns `false` if nothing was started: no valid index, or a deletion
    /// already in flight. Otherwise `completion` runs once the service is
    /// pumped, after a state change has been announced. Removed items leave
    /// the list through the removal broadcast, see [`Self::apply_removals`].
    pub fn delete_selected(&mut self, indices: &[usize], completion: DeleteCompletion) -> bool {
        if self.service.is_deletion_in_progress() {
            return false;
        }

        let items: Vec<Item> = indices
            .iter()
            .filter_map(|&index| self.item_at(index).cloned())
            .collect();
        if items.is_empty() {
            return false;
        }

        let events = self.events.clone();
        self.service.delete(
            items,
            Box::new(move |report| {
                let _ = events.send(DirectoryEvent::StateChanged);
                completion(report);
            }),
        );
        self.emit(DirectoryEvent::StateChanged);
        true
    }

    /// Current selection, no I/O involved
    pub fn choose_selected(&self) -> Vec<Item> {
        self.selected_items.clone()
    }

    /// Drop every item announced as removed since the last call.
    /// Returns the number of notifications processed.
    pub fn apply_removals(&mut self) -> usize {
        let notifications = self.subscription.drain();
        for removed in &notifications {
            self.remove_items(removed);
        }
        notifications.len()
    }

    /// Replace the listing with freshly loaded children, keeping the
    /// selection entries that are still present.
    pub fn reload(&mut self, children: Vec<Item>) {
        self.all_items = admitted(&self.configuration, children);
        let all_items = &self.all_items;
        self.selected_items.retain(|item| all_items.contains(item));
        self.refresh_display();
        self.emit(DirectoryEvent::ItemsListChanged);
    }

    pub fn is_user_interaction_enabled(&self) -> bool {
        !self.service.is_deletion_in_progress()
    }

    pub fn is_edit_action_visible(&self) -> bool {
        let actions = &self.configuration.actions;
        actions.can_choose_files
            || actions.can_choose_directories
            || actions.can_remove_files
            || actions.can_remove_directories
    }

    pub fn is_edit_action_enabled(&self) -> bool {
        self.is_edit_action_visible() && !self.service.is_deletion_in_progress()
    }

    pub fn is_delete_action_visible(&self) -> bool {
        let actions = &self.configuration.actions;
        actions.can_remove_files || actions.can_remove_directories
    }

    pub fn is_delete_action_enabled(&self) -> bool {
        self.is_delete_action_visible()
            && !self.selected_items.is_empty()
            && !self.service.is_deletion_in_progress()
            && self
                .selected_items
                .iter()
                .all(|item| self.configuration.actions.can_remove(item.kind()))
    }

    pub fn is_select_action_visible(&self) -> bool {
        let actions = &self.configuration.actions;
        actions.can_choose_files || actions.can_choose_directories
    }

    pub fn is_select_action_enabled(&self) -> bool {
        let count_ok = if self.configuration.actions.allows_multiple_selection {
            !self.selected_items.is_empty()
        } else {
            self.selected_items.len() == 1
        };

        self.is_select_action_visible()
            && !self.service.is_deletion_in_progress()
            && count_ok
            && self
                .selected_items
                .iter()
                .all(|item| self.configuration.actions.can_choose(item.kind()))
    }

    pub fn is_share_action_visible(&self) -> bool {
        self.configuration.actions.can_share_files
    }

    pub fn is_share_action_enabled(&self) -> bool {
        self.is_share_action_visible()
            && !self.selected_items.is_empty()
            && self.selected_items.iter().all(|item| !item.is_directory())
            && !self.service.is_deletion_in_progress()
    }

    fn remove_items(&mut self, removed: &[Item]) {
        self.all_items.retain(|item| !removed.contains(item));
        self.items_to_display.retain(|item| !removed.contains(item));
        self.selected_items.retain(|item| !removed.contains(item));
        self.emit(DirectoryEvent::ItemsListChanged);
    }

    fn refresh_display(&mut self) {
        let query = self.search_query.to_lowercase();
        let mut items: Vec<Item> = self
            .all_items
            .iter()
            .filter(|item| query.is_empty() || item.name().to_lowercase().contains(&query))
            .cloned()
            .collect();

        match self.sort_mode {
            SortMode::Name => items.sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str())),
            SortMode::Date => items.sort_by(|a, b| b.modified().cmp(&a.modified())),
        }

        self.items_to_display = items;
    }

    fn emit(&self, event: DirectoryEvent) {
        // The host may have stopped listening
        let _ = self.events.send(event);
    }
}

fn admitted(configuration: &Configuration, items: Vec<Item>) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| configuration.filtering.admits(item))
        .collect()
}
