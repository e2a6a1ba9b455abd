use std::path::PathBuf;

use fex_core::{Command, DirectoryContentViewModel, Screen, Session, SessionEvent};

use super::action::Action;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Browsing the top screen
    Browsing,
    /// Typing a search query
    Searching,
    /// Showing help overlay
    Help,
    /// Showing delete confirmation dialog
    ConfirmDelete,
}

/// Cursor state of one screen
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub selected_index: usize,
    pub scroll_offset: usize,
    /// Search text as typed, before trimming
    pub search_input: String,
}

/// Application state
pub struct AppState {
    /// Current mode
    pub mode: AppMode,
    /// Navigation stack and background work
    pub session: Session,
    /// Cursor of every open screen, parallel to the session's stack
    pub views: Vec<ViewState>,
    /// Visible area height (set by UI)
    pub visible_height: usize,
    /// Whether app should quit
    pub should_quit: bool,
    /// Spinner frame for animation
    pub spinner_frame: usize,
    /// Message shown until the next action
    pub error_message: Option<String>,
    /// Paths picked by the user, printed on exit
    pub chosen: Vec<PathBuf>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        let mut state = Self {
            mode: AppMode::Browsing,
            session,
            views: Vec::new(),
            visible_height: 20,
            should_quit: false,
            spinner_frame: 0,
            error_message: None,
            chosen: Vec::new(),
        };
        state.sync_views();
        state
    }

    /// Deliver background completions
    pub fn poll(&mut self) {
        let events = self.session.poll();
        self.apply_events(events);
    }

    pub fn handle_action(&mut self, action: Action) {
        if action != Action::Tick {
            self.error_message = None;
        }

        match action {
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-(self.page_size() as isize)),
            Action::PageDown => self.move_by(self.page_size() as isize),
            Action::GoToFirst => self.move_by(isize::MIN),
            Action::GoToLast => self.move_by(isize::MAX),
            Action::Activate => self.command(Command::Activate(self.cursor())),
            Action::ShowDetails => self.command(Command::ShowDetails(self.cursor())),
            Action::ToggleEditing => self.toggle_editing(),
            Action::ToggleSelection => {
                if self.session.directory().is_some_and(|vm| vm.is_editing()) {
                    self.command(Command::Activate(self.cursor()));
                }
            }
            Action::Delete => self.request_delete(),
            Action::ConfirmDelete => {
                self.mode = AppMode::Browsing;
                self.command(Command::DeleteSelected);
            }
            Action::CancelDelete => self.mode = AppMode::Browsing,
            Action::Choose => self.choose(),
            Action::StartSearch => {
                if self.session.directory().is_some() {
                    self.mode = AppMode::Searching;
                }
            }
            Action::SearchInput(c) => self.edit_query(|query| query.push(c)),
            Action::SearchBackspace => self.edit_query(|query| {
                query.pop();
            }),
            Action::SubmitSearch => self.mode = AppMode::Browsing,
            Action::CancelSearch => {
                self.edit_query(String::clear);
                self.mode = AppMode::Browsing;
            }
            Action::ToggleSort => {
                if let Some(vm) = self.session.directory_mut() {
                    vm.set_sort_mode(vm.sort_mode().toggle());
                    self.reset_cursor();
                }
            }
            Action::GoBack => self.go_back(),
            Action::ShowHelp => self.mode = AppMode::Help,
            Action::HideHelp => self.mode = AppMode::Browsing,
            Action::Quit => self.command(Command::Finish),
            Action::Tick => self.spinner_frame = (self.spinner_frame + 1) % 10,
        }
    }

    /// Directory shown on top, if any
    pub fn directory(&self) -> Option<&DirectoryContentViewModel> {
        self.session.directory()
    }

    pub fn view(&self) -> ViewState {
        self.views.last().cloned().unwrap_or_default()
    }

    /// Items of the delete confirmation dialog
    pub fn pending_delete_names(&self) -> Vec<String> {
        self.directory()
            .map(|vm| vm.selected_items().iter().map(|item| item.name()).collect())
            .unwrap_or_default()
    }

    fn cursor(&self) -> usize {
        self.view().selected_index
    }

    fn item_count(&self) -> usize {
        self.directory().map(|vm| vm.items().len()).unwrap_or(0)
    }

    fn page_size(&self) -> usize {
        self.visible_height.saturating_sub(2).max(1)
    }

    fn command(&mut self, command: Command) {
        let events = self.session.handle(command);
        self.apply_events(events);
    }

    fn apply_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Chose(paths) => self.chosen = paths,
                SessionEvent::Finished => self.should_quit = true,
                SessionEvent::Changed => {}
                SessionEvent::DeleteFailed { failed, message } => {
                    tracing::warn!(failed = failed.len(), "delete failed");
                    self.error_message = Some(message);
                }
            }
        }
        self.sync_views();
    }

    /// Match the cursor stack to the screen stack and clamp the top cursor
    fn sync_views(&mut self) {
        let depth = self.session.depth();
        self.views.truncate(depth);
        while self.views.len() < depth {
            self.views.push(ViewState::default());
        }

        let count = self.item_count();
        let height = self.visible_height;
        if let Some(view) = self.views.last_mut() {
            view.selected_index = view.selected_index.min(count.saturating_sub(1));
            ensure_visible(view, height);
        }
    }

    fn move_by(&mut self, delta: isize) {
        let count = self.item_count();
        let height = self.visible_height;
        if let Some(view) = self.views.last_mut() {
            let target = (view.selected_index as isize).saturating_add(delta);
            view.selected_index = target.clamp(0, count.saturating_sub(1) as isize) as usize;
            ensure_visible(view, height);
        }
    }

    fn reset_cursor(&mut self) {
        if let Some(view) = self.views.last_mut() {
            view.selected_index = 0;
            view.scroll_offset = 0;
        }
    }

    fn toggle_editing(&mut self) {
        if let Some(vm) = self.session.directory_mut()
            && vm.is_edit_action_enabled()
        {
            vm.set_editing(!vm.is_editing());
        }
        self.poll();
    }

    fn request_delete(&mut self) {
        let Some(vm) = self.directory() else {
            return;
        };
        let enabled = vm.is_delete_action_enabled();
        let hint = vm.is_delete_action_visible() && !vm.is_editing();

        if enabled {
            self.mode = AppMode::ConfirmDelete;
        } else if hint {
            self.error_message = Some("Press v and select items to delete".to_string());
        }
    }

    fn choose(&mut self) {
        let Some(vm) = self.directory() else {
            return;
        };
        if !vm.is_select_action_visible() {
            return;
        }
        if vm.is_select_action_enabled() {
            self.command(Command::ChooseSelected);
        } else if vm.configuration().actions.allows_multiple_selection {
            self.error_message = Some("Select at least one item to choose".to_string());
        } else {
            self.error_message = Some("Select exactly one item to choose".to_string());
        }
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(view) = self.views.last_mut() else {
            return;
        };
        if let Some(vm) = self.session.directory_mut() {
            edit(&mut view.search_input);
            vm.set_search_query(&view.search_input);
            self.reset_cursor();
        }
    }

    fn go_back(&mut self) {
        if let Some(vm) = self.session.directory_mut()
            && vm.is_editing()
        {
            vm.set_editing(false);
            self.poll();
            return;
        }
        self.command(Command::Back);
    }
}

/// Scroll so the cursor stays inside the viewport
fn ensure_visible(view: &mut ViewState, visible_height: usize) {
    let height = visible_height.max(1);
    if view.selected_index < view.scroll_offset {
        view.scroll_offset = view.selected_index;
    } else if view.selected_index >= view.scroll_offset + height {
        view.scroll_offset = view.selected_index - height + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fex_core::{
        ActionsConfiguration, Configuration, FileSpecifications, LocalFileService, LocalStorage,
        RemovalBroadcast, root_item,
    };
    use std::fs;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        root: PathBuf,
        service: Rc<LocalFileService>,
        state: AppState,
    }

    impl Fixture {
        fn new(actions: ActionsConfiguration) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().to_path_buf();
            fs::create_dir(root.join("docs")).unwrap();
            fs::write(root.join("docs/readme.md"), "# docs").unwrap();
            fs::write(root.join("a.txt"), "a").unwrap();
            fs::write(root.join("b.txt"), "b").unwrap();
            fs::write(root.join("c.png"), "c").unwrap();
            Self::open(temp, actions)
        }

        fn with_files(actions: ActionsConfiguration, names: &[&str]) -> Self {
            let temp = TempDir::new().unwrap();
            for name in names {
                fs::write(temp.path().join(name), name).unwrap();
            }
            Self::open(temp, actions)
        }

        fn open(temp: TempDir, actions: ActionsConfiguration) -> Self {
            let root = temp.path().to_path_buf();

            let broadcast = RemovalBroadcast::new();
            let service = Rc::new(LocalFileService::new(broadcast.clone()));
            let mut session = Session::new(
                service.clone(),
                broadcast,
                Configuration {
                    actions,
                    ..Default::default()
                },
                FileSpecifications::default(),
            );
            session.start(root_item(&LocalStorage, &root).unwrap());

            let mut fixture = Self {
                _temp: temp,
                root,
                service,
                state: AppState::new(session),
            };
            fixture.settle();
            fixture
        }

        fn settle(&mut self) {
            self.service.wait(Duration::from_secs(5));
            self.state.poll();
        }

        fn names(&self) -> Vec<String> {
            self.state
                .directory()
                .unwrap()
                .items()
                .iter()
                .map(|i| i.name())
                .collect()
        }
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut f = Fixture::new(ActionsConfiguration::default());
        assert_eq!(f.names(), vec!["a.txt", "b.txt", "c.png", "docs"]);

        f.state.handle_action(Action::MoveUp);
        assert_eq!(f.state.view().selected_index, 0);
        f.state.handle_action(Action::GoToLast);
        assert_eq!(f.state.view().selected_index, 3);
        f.state.handle_action(Action::MoveDown);
        assert_eq!(f.state.view().selected_index, 3);
        f.state.handle_action(Action::GoToFirst);
        assert_eq!(f.state.view().selected_index, 0);
    }

    #[test]
    fn test_enter_directory_and_back() {
        let mut f = Fixture::new(ActionsConfiguration::default());
        f.state.handle_action(Action::GoToLast);
        f.state.handle_action(Action::Activate);
        f.settle();

        assert_eq!(f.state.views.len(), 2);
        assert_eq!(f.names(), vec!["readme.md"]);
        assert_eq!(f.state.view().selected_index, 0);

        f.state.handle_action(Action::GoBack);
        assert_eq!(f.state.view().selected_index, 3);
        f.state.handle_action(Action::GoBack);
        assert!(f.state.should_quit);
        assert!(f.state.chosen.is_empty());
    }

    #[test]
    fn test_search_and_cancel() {
        let mut f = Fixture::new(ActionsConfiguration::default());
        f.state.handle_action(Action::StartSearch);
        assert_eq!(f.state.mode, AppMode::Searching);

        f.state.handle_action(Action::SearchInput('t'));
        f.state.handle_action(Action::SearchInput('x'));
        assert_eq!(f.names(), vec!["a.txt", "b.txt"]);

        f.state.handle_action(Action::SearchBackspace);
        f.state.handle_action(Action::SearchBackspace);
        f.state.handle_action(Action::SearchInput('p'));
        assert_eq!(f.names(), vec!["c.png"]);

        f.state.handle_action(Action::CancelSearch);
        assert_eq!(f.state.mode, AppMode::Browsing);
        assert_eq!(f.names().len(), 4);
    }

    #[test]
    fn test_search_keeps_inner_space() {
        let mut f = Fixture::with_files(
            ActionsConfiguration::default(),
            &["my file.txt", "myfile.txt"],
        );
        f.state.handle_action(Action::StartSearch);
        for c in "my f".chars() {
            f.state.handle_action(Action::SearchInput(c));
        }

        assert_eq!(f.state.view().search_input, "my f");
        assert_eq!(f.state.directory().unwrap().search_query(), "my f");
        assert_eq!(f.names(), vec!["my file.txt"]);

        f.state.handle_action(Action::CancelSearch);
        assert!(f.state.view().search_input.is_empty());
    }

    #[test]
    fn test_choose_multiple_files() {
        let mut f = Fixture::new(ActionsConfiguration {
            can_choose_files: true,
            allows_multiple_selection: true,
            ..Default::default()
        });

        f.state.handle_action(Action::Choose);
        assert!(f.state.error_message.is_some());

        f.state.handle_action(Action::ToggleEditing);
        f.state.handle_action(Action::ToggleSelection);
        f.state.handle_action(Action::MoveDown);
        f.state.handle_action(Action::ToggleSelection);
        f.state.handle_action(Action::Choose);

        assert!(f.state.should_quit);
        assert_eq!(f.state.chosen, vec![f.root.join("a.txt"), f.root.join("b.txt")]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut f = Fixture::new(ActionsConfiguration {
            can_remove_files: true,
            ..Default::default()
        });

        f.state.handle_action(Action::Delete);
        assert_eq!(f.state.mode, AppMode::Browsing);
        assert!(f.state.error_message.is_some());

        f.state.handle_action(Action::ToggleEditing);
        f.state.handle_action(Action::ToggleSelection);
        f.state.handle_action(Action::Delete);
        assert_eq!(f.state.mode, AppMode::ConfirmDelete);
        assert_eq!(f.state.pending_delete_names(), vec!["a.txt"]);

        f.state.handle_action(Action::ConfirmDelete);
        f.settle();

        assert_eq!(f.names(), vec!["b.txt", "c.png", "docs"]);
        assert!(!f.root.join("a.txt").exists());
    }

    #[test]
    fn test_go_back_leaves_edit_mode_first() {
        let mut f = Fixture::new(ActionsConfiguration {
            can_choose_files: true,
            ..Default::default()
        });
        f.state.handle_action(Action::ToggleEditing);
        f.state.handle_action(Action::ToggleSelection);

        f.state.handle_action(Action::GoBack);
        let vm = f.state.directory().unwrap();
        assert!(!vm.is_editing());
        assert!(vm.selected_items().is_empty());
        assert!(!f.state.should_quit);
    }

    #[test]
    fn test_toggle_sort_orders_by_date() {
        let mut f = Fixture::new(ActionsConfiguration::default());
        f.state.handle_action(Action::ToggleSort);
        assert_eq!(
            f.state.directory().unwrap().sort_mode(),
            fex_core::SortMode::Date
        );
        assert_eq!(f.names().len(), 4);
    }
}
