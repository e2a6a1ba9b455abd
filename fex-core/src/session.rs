use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crossbeam_channel::Receiver;

use crate::broadcast::RemovalBroadcast;
use crate::config::Configuration;
use crate::directory::{DirectoryContentViewModel, DirectoryEvent, SortMode};
use crate::error::{FexError, Result};
use crate::file::FileViewModel;
use crate::item::{Item, LoadedItem, Resource};
use crate::service::{DeletionReport, FileService, Storage};
use crate::specification::FileSpecifications;

pub type ScreenId = u64;

type LoadInbox = Rc<RefCell<Vec<(ScreenId, Result<LoadedItem<Resource>>)>>>;

/// One entry of the navigation stack
pub enum Screen {
    /// Waiting for an item to load
    Loading { item: Item },
    Directory {
        view_model: DirectoryContentViewModel,
        events: Receiver<DirectoryEvent>,
    },
    File { view_model: FileViewModel },
    Error { item: Item, message: String },
}

impl Screen {
    pub fn title(&self) -> String {
        match self {
            Screen::Loading { item } | Screen::Error { item, .. } => item.name(),
            Screen::Directory { view_model, .. } => view_model.title(),
            Screen::File { view_model } => view_model.title(),
        }
    }
}

struct Frame {
    id: ScreenId,
    screen: Screen,
}

/// Requests from the host, applied to the top screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the item in browsing, toggle its selection in edit mode
    Activate(usize),
    /// Open the details screen of a file
    ShowDetails(usize),
    ChooseSelected,
    DeleteSelected,
    /// Pop the top screen
    Back,
    /// Close every screen
    Finish,
}

/// What the host needs to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user picked these paths; the session is over
    Chose(Vec<PathBuf>),
    Finished,
    /// Something visible changed and the host should redraw
    Changed,
    DeleteFailed { failed: Vec<PathBuf>, message: String },
}

/// Owns the navigation stack of one browsing session.
///
/// Screens form a strict stack. Load completions are addressed to the
/// screen that requested them and dropped if it is gone by the time they
/// arrive. Everything runs on the thread calling `handle` and `poll`.
pub struct Session {
    service: Rc<dyn FileService>,
    broadcast: RemovalBroadcast,
    configuration: Configuration,
    specifications: FileSpecifications,
    sort_mode: SortMode,
    screens: Vec<Frame>,
    next_screen: ScreenId,
    loads: LoadInbox,
    deletions: Rc<RefCell<Vec<DeletionReport>>>,
    finished: bool,
}

impl Session {
    /// `broadcast` must be the one `service` publishes removals to
    pub fn new(
        service: Rc<dyn FileService>,
        broadcast: RemovalBroadcast,
        configuration: Configuration,
        specifications: FileSpecifications,
    ) -> Self {
        Self {
            service,
            broadcast,
            configuration,
            specifications,
            sort_mode: SortMode::default(),
            screens: Vec::new(),
            next_screen: 0,
            loads: Rc::new(RefCell::new(Vec::new())),
            deletions: Rc::new(RefCell::new(Vec::new())),
            finished: false,
        }
    }

    /// Sort mode applied to directory screens as they open
    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_deletion_in_progress(&self) -> bool {
        self.service.is_deletion_in_progress()
    }

    pub fn depth(&self) -> usize {
        self.screens.len()
    }

    pub fn top(&self) -> Option<&Screen> {
        self.screens.last().map(|frame| &frame.screen)
    }

    pub fn top_mut(&mut self) -> Option<&mut Screen> {
        self.screens.last_mut().map(|frame| &mut frame.screen)
    }

    /// View-model of the top screen, if it is a directory
    pub fn directory_mut(&mut self) -> Option<&mut DirectoryContentViewModel> {
        match self.top_mut() {
            Some(Screen::Directory { view_model, .. }) => Some(view_model),
            _ => None,
        }
    }

    pub fn directory(&self) -> Option<&DirectoryContentViewModel> {
        match self.top() {
            Some(Screen::Directory { view_model, .. }) => Some(view_model),
            _ => None,
        }
    }

    /// Titles of every open screen, bottom first
    pub fn breadcrumb(&self) -> Vec<String> {
        self.screens.iter().map(|frame| frame.screen.title()).collect()
    }

    /// Open `item` as the first screen
    pub fn start(&mut self, item: Item) {
        self.finished = false;
        self.push_loading(item);
    }

    pub fn handle(&mut self, command: Command) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        match command {
            Command::Activate(index) => {
                if let Some(view_model) = self.directory_mut() {
                    if view_model.is_editing() {
                        view_model.toggle_display_item(index);
                    } else {
                        view_model.select_display_item(index);
                    }
                }
            }
            Command::ShowDetails(index) => {
                let file = self
                    .directory()
                    .and_then(|vm| vm.item_at(index))
                    .filter(|item| !item.is_directory())
                    .cloned();
                if let Some(file) = file {
                    self.push_loading(file);
                    events.push(SessionEvent::Changed);
                }
            }
            Command::ChooseSelected => {
                let chosen = self
                    .directory()
                    .filter(|vm| vm.is_select_action_enabled())
                    .map(DirectoryContentViewModel::choose_selected);
                if let Some(items) = chosen {
                    self.choose(items, &mut events);
                }
            }
            Command::DeleteSelected => self.delete_selected(),
            Command::Back => {
                self.screens.pop();
                if self.screens.is_empty() {
                    self.finish(&mut events);
                } else {
                    events.push(SessionEvent::Changed);
                }
            }
            Command::Finish => self.finish(&mut events),
        }

        self.drain_directory_events(&mut events);
        events
    }

    /// Deliver finished background work and collect the resulting events
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.service.poll();

        let loads: Vec<_> = self.loads.borrow_mut().drain(..).collect();
        for (id, result) in loads {
            self.resolve(id, result, &mut events);
        }

        let reports: Vec<_> = self.deletions.borrow_mut().drain(..).collect();
        for report in reports {
            if let Err(e) = report.result {
                events.push(SessionEvent::DeleteFailed {
                    failed: report.failed.iter().map(|i| i.path().to_path_buf()).collect(),
                    message: e.to_string(),
                });
            }
        }

        for frame in &mut self.screens {
            if let Screen::Directory { view_model, .. } = &mut frame.screen {
                view_model.apply_removals();
            }
        }

        self.drain_directory_events(&mut events);
        events
    }

    fn push_loading(&mut self, item: Item) {
        let id = self.next_screen;
        self.next_screen += 1;

        let inbox = self.loads.clone();
        self.service.load(
            item.clone(),
            Box::new(move |result| inbox.borrow_mut().push((id, result))),
        );
        self.screens.push(Frame {
            id,
            screen: Screen::Loading { item },
        });
    }

    fn resolve(
        &mut self,
        id: ScreenId,
        result: Result<LoadedItem<Resource>>,
        events: &mut Vec<SessionEvent>,
    ) {
        let Some(frame) = self.screens.iter_mut().find(|frame| frame.id == id) else {
            tracing::debug!(screen = id, "dropping load for a closed screen");
            return;
        };
        let Screen::Loading { item } = &frame.screen else {
            return;
        };
        let item = item.clone();

        frame.screen = match result {
            Ok(loaded) => match loaded.resource {
                Resource::Children(_) => {
                    let (mut view_model, rx) = DirectoryContentViewModel::new(
                        loaded.into_directory(),
                        self.configuration.clone(),
                        self.service.clone(),
                        &self.broadcast,
                    );
                    if self.sort_mode != SortMode::default() {
                        view_model.set_sort_mode(self.sort_mode);
                    }
                    Screen::Directory {
                        view_model,
                        events: rx,
                    }
                }
                Resource::Data(_) => Screen::File {
                    view_model: FileViewModel::new(loaded.into_file(), &self.specifications),
                },
            },
            Err(e) => {
                tracing::warn!(path = %item.path().display(), error = %e, "load failed");
                Screen::Error {
                    item,
                    message: e.to_string(),
                }
            }
        };
        events.push(SessionEvent::Changed);
    }

    fn delete_selected(&mut self) {
        let inbox = self.deletions.clone();
        if let Some(view_model) = self.directory_mut()
            && view_model.is_delete_action_enabled()
        {
            let indices = view_model.selected_display_indices();
            view_model.delete_selected(
                &indices,
                Box::new(move |report| inbox.borrow_mut().push(report)),
            );
        }
    }

    fn drain_directory_events(&mut self, out: &mut Vec<SessionEvent>) {
        let pending: Vec<DirectoryEvent> = self
            .screens
            .iter()
            .filter_map(|frame| match &frame.screen {
                Screen::Directory { events, .. } => Some(events.try_iter().collect::<Vec<_>>()),
                _ => None,
            })
            .flatten()
            .collect();

        for event in pending {
            if self.finished {
                break;
            }
            match event {
                DirectoryEvent::ItemsListChanged | DirectoryEvent::StateChanged => {
                    if !out.contains(&SessionEvent::Changed) {
                        out.push(SessionEvent::Changed);
                    }
                }
                DirectoryEvent::ItemActivated(item) => {
                    self.push_loading(item);
                    out.push(SessionEvent::Changed);
                }
                DirectoryEvent::ItemsChosen(items) => self.choose(items, out),
            }
        }
    }

    fn choose(&mut self, items: Vec<Item>, out: &mut Vec<SessionEvent>) {
        let paths = items.iter().map(|item| item.path().to_path_buf()).collect();
        out.push(SessionEvent::Chose(paths));
        self.finish(out);
    }

    fn finish(&mut self, out: &mut Vec<SessionEvent>) {
        self.screens.clear();
        self.finished = true;
        out.push(SessionEvent::Finished);
    }
}

/// Resolve the directory a session starts in
pub fn root_item(storage: &dyn Storage, path: &Path) -> Result<Item> {
    let item =
        Item::stat(storage, path).ok_or_else(|| FexError::PathNotFound(path.to_path_buf()))?;
    if !item.is_directory() {
        return Err(FexError::NotADirectory(path.to_path_buf()));
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionsConfiguration;
    use crate::service::{LocalFileService, LocalStorage};
    use crate::specification::PreviewKind;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct Harness {
        _temp: TempDir,
        root: PathBuf,
        service: Rc<LocalFileService>,
        session: Session,
    }

    impl Harness {
        fn new(actions: ActionsConfiguration) -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().to_path_buf();
            fs::create_dir(root.join("directory")).unwrap();
            fs::write(root.join("directory/inner.txt"), "inner").unwrap();
            fs::write(root.join("audio.mp3"), "mp3").unwrap();
            fs::write(root.join("image.png"), "png").unwrap();
            fs::write(root.join("notes.txt"), "some notes").unwrap();

            let broadcast = RemovalBroadcast::new();
            let service = Rc::new(LocalFileService::new(broadcast.clone()));
            let configuration = Configuration {
                actions,
                ..Default::default()
            };
            let session = Session::new(
                service.clone(),
                broadcast,
                configuration,
                FileSpecifications::default(),
            );

            Self {
                _temp: temp,
                root,
                service,
                session,
            }
        }

        fn settle(&mut self) -> Vec<SessionEvent> {
            self.service.wait(TIMEOUT);
            self.session.poll()
        }

        fn start(&mut self) {
            let item = root_item(&LocalStorage, &self.root).unwrap();
            self.session.start(item);
            self.settle();
        }

        fn index_of(&self, name: &str) -> usize {
            self.session
                .directory()
                .unwrap()
                .items()
                .iter()
                .position(|i| i.name() == name)
                .unwrap()
        }
    }

    #[test]
    fn test_start_opens_directory() {
        let mut h = Harness::new(ActionsConfiguration::default());
        let item = root_item(&LocalStorage, &h.root).unwrap();
        h.session.start(item);
        assert!(matches!(h.session.top(), Some(Screen::Loading { .. })));

        let events = h.settle();
        assert!(events.contains(&SessionEvent::Changed));
        assert_eq!(h.session.directory().unwrap().items().len(), 4);
        assert_eq!(h.session.depth(), 1);
    }

    #[test]
    fn test_root_item_validation() {
        let h = Harness::new(ActionsConfiguration::default());
        assert!(matches!(
            root_item(&LocalStorage, &h.root.join("missing")),
            Err(FexError::PathNotFound(_))
        ));
        assert!(matches!(
            root_item(&LocalStorage, &h.root.join("notes.txt")),
            Err(FexError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_navigate_into_directory_and_back() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.start();

        let index = h.index_of("directory");
        h.session.handle(Command::Activate(index));
        assert_eq!(h.session.depth(), 2);
        h.settle();

        let names: Vec<_> = h
            .session
            .directory()
            .unwrap()
            .items()
            .iter()
            .map(Item::name)
            .collect();
        assert_eq!(names, vec!["inner.txt"]);
        assert_eq!(h.session.breadcrumb().len(), 2);

        assert_eq!(h.session.handle(Command::Back), vec![SessionEvent::Changed]);
        assert_eq!(h.session.depth(), 1);
        assert_eq!(h.session.handle(Command::Back), vec![SessionEvent::Finished]);
        assert!(h.session.is_finished());
    }

    #[test]
    fn test_load_for_popped_screen_is_dropped() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.start();

        let index = h.index_of("directory");
        h.session.handle(Command::Activate(index));
        h.session.handle(Command::Back);
        h.settle();

        assert_eq!(h.session.depth(), 1);
        assert_eq!(h.session.directory().unwrap().items().len(), 4);
    }

    #[test]
    fn test_activate_file_opens_details() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.start();

        let index = h.index_of("image.png");
        h.session.handle(Command::Activate(index));
        h.settle();

        let Some(Screen::File { view_model }) = h.session.top() else {
            panic!("expected file screen");
        };
        assert_eq!(view_model.preview_kind(), PreviewKind::Image);
        assert_eq!(view_model.text_excerpt(), Some("png"));
    }

    #[test]
    fn test_show_details_ignores_directories() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.start();

        let index = h.index_of("directory");
        assert!(h.session.handle(Command::ShowDetails(index)).is_empty());
        assert_eq!(h.session.depth(), 1);
    }

    #[test]
    fn test_direct_selection_finishes_with_file() {
        let mut h = Harness::new(ActionsConfiguration {
            can_choose_files: true,
            direct_selection: true,
            ..Default::default()
        });
        h.start();

        let index = h.index_of("notes.txt");
        let events = h.session.handle(Command::Activate(index));
        assert_eq!(
            events,
            vec![
                SessionEvent::Chose(vec![h.root.join("notes.txt")]),
                SessionEvent::Finished,
            ]
        );
        assert_eq!(h.session.depth(), 0);
    }

    #[test]
    fn test_choose_selected_in_edit_mode() {
        let mut h = Harness::new(ActionsConfiguration {
            can_choose_files: true,
            allows_multiple_selection: true,
            ..Default::default()
        });
        h.start();

        let audio = h.index_of("audio.mp3");
        let notes = h.index_of("notes.txt");
        h.session.directory_mut().unwrap().set_editing(true);
        h.session.handle(Command::Activate(audio));
        h.session.handle(Command::Activate(notes));

        let events = h.session.handle(Command::ChooseSelected);
        assert_eq!(
            events,
            vec![
                SessionEvent::Chose(vec![h.root.join("audio.mp3"), h.root.join("notes.txt")]),
                SessionEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_choose_without_selection_does_nothing() {
        let mut h = Harness::new(ActionsConfiguration {
            can_choose_files: true,
            ..Default::default()
        });
        h.start();
        assert!(h.session.handle(Command::ChooseSelected).is_empty());
        assert!(!h.session.is_finished());
    }

    #[test]
    fn test_delete_selected_prunes_listing() {
        let mut h = Harness::new(ActionsConfiguration {
            can_remove_files: true,
            ..Default::default()
        });
        h.start();

        let index = h.index_of("audio.mp3");
        h.session.directory_mut().unwrap().set_editing(true);
        h.session.handle(Command::Activate(index));
        h.session.handle(Command::DeleteSelected);
        assert!(h.session.is_deletion_in_progress());

        let events = h.settle();
        assert!(events.contains(&SessionEvent::Changed));
        assert!(!h.session.is_deletion_in_progress());

        let vm = h.session.directory().unwrap();
        assert_eq!(vm.items().len(), 3);
        assert!(vm.selected_items().is_empty());
        assert!(!h.root.join("audio.mp3").exists());
    }

    #[test]
    fn test_failed_delete_is_reported() {
        let mut h = Harness::new(ActionsConfiguration {
            can_remove_files: true,
            ..Default::default()
        });
        h.start();

        let index = h.index_of("notes.txt");
        fs::remove_file(h.root.join("notes.txt")).unwrap();
        h.session.directory_mut().unwrap().set_editing(true);
        h.session.handle(Command::Activate(index));
        h.session.handle(Command::DeleteSelected);

        let events = h.settle();
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::DeleteFailed { failed, .. } if failed == &vec![h.root.join("notes.txt")]
        )));
        assert_eq!(h.session.directory().unwrap().items().len(), 4);
    }

    #[test]
    fn test_load_failure_shows_error_screen() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.start();

        let index = h.index_of("directory");
        fs::remove_dir_all(h.root.join("directory")).unwrap();
        h.session.handle(Command::Activate(index));
        h.settle();

        assert!(matches!(h.session.top(), Some(Screen::Error { .. })));
        h.session.handle(Command::Back);
        assert!(h.session.directory().is_some());
    }

    #[test]
    fn test_date_sort_applies_to_new_screens() {
        let mut h = Harness::new(ActionsConfiguration::default());
        h.session = Session::new(
            h.service.clone(),
            RemovalBroadcast::new(),
            Configuration::default(),
            FileSpecifications::default(),
        )
        .with_sort_mode(SortMode::Date);
        h.start();

        assert_eq!(h.session.directory().unwrap().sort_mode(), SortMode::Date);
    }
}
