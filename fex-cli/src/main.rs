mod app;
mod config;
mod logging;
mod tui;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fex_core::{
    Filter, LocalFileService, LocalStorage, RemovalBroadcast, Screen, Session, SortMode, root_item,
};
use ratatui::{Terminal, backend::CrosstermBackend, style::Style, widgets::Widget};

use app::{AppMode, AppState};
use config::{Settings, default_config_path};
use tui::{AppEvent, EventHandler, handle_key};
use ui::{
    AppLayout, ConfirmDeleteView, ErrorView, FileDetails, Footer, Header, HelpView, ItemList,
    LoadingView, StatusLine, Theme,
};

/// FEX - Terminal file explorer and file picker
#[derive(Parser, Debug)]
#[command(name = "fex")]
#[command(about = "A terminal file explorer that doubles as a file picker")]
#[command(version)]
struct Args {
    /// Directory to open (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Settings file (defaults to ~/.config/fex/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Allow deleting files
    #[arg(long)]
    remove_files: bool,

    /// Allow deleting directories
    #[arg(long)]
    remove_directories: bool,

    /// Allow choosing files
    #[arg(long)]
    choose_files: bool,

    /// Allow choosing directories
    #[arg(long)]
    choose_directories: bool,

    /// Allow choosing more than one item
    #[arg(short, long)]
    multiple: bool,

    /// Choose a file as soon as it is opened
    #[arg(long)]
    direct: bool,

    /// Only show files with this extension (repeatable)
    #[arg(long = "include-ext", value_name = "EXT")]
    include_ext: Vec<String>,

    /// Hide files with this extension (repeatable)
    #[arg(long = "exclude-ext", value_name = "EXT")]
    exclude_ext: Vec<String>,

    /// Initial sort order
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Log filter, e.g. "debug" (also FEX_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

/// Sort order accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SortArg {
    /// Alphabetical by name
    Name,
    /// Newest first
    Date,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortMode::Name,
            SortArg::Date => SortMode::Date,
        }
    }
}

impl Args {
    /// Layer command-line flags over the settings file
    fn apply(&self, settings: &mut Settings) {
        let actions = &mut settings.actions;
        actions.can_remove_files |= self.remove_files;
        actions.can_remove_directories |= self.remove_directories;
        actions.can_choose_files |= self.choose_files;
        actions.can_choose_directories |= self.choose_directories;
        actions.allows_multiple_selection |= self.multiple;
        actions.direct_selection |= self.direct;

        let filtering = &mut settings.filtering;
        filtering
            .include_filters
            .extend(self.include_ext.iter().cloned().map(Filter::Extension));
        filtering
            .exclude_filters
            .extend(self.exclude_ext.iter().cloned().map(Filter::Extension));

        if let Some(sort) = self.sort {
            settings.sort = sort.into();
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut settings = Settings::load(&config_path)?;
    args.apply(&mut settings);

    let level = logging::resolve_level(
        args.log_level.as_deref(),
        std::env::var(logging::LOG_ENV).ok(),
        settings.log_level.as_deref(),
    );
    let _log_guard = logging::init(&level)?;

    // Resolve path
    let path = args.path.canonicalize().unwrap_or_else(|_| args.path.clone());
    let root = match root_item(&LocalStorage, &path) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(path = %path.display(), config = %config_path.display(), "starting");

    let broadcast = RemovalBroadcast::new();
    let service = Rc::new(LocalFileService::new(broadcast.clone()));
    let mut session = Session::new(
        service,
        broadcast,
        settings.configuration(),
        settings.file_specifications(),
    )
    .with_sort_mode(settings.sort);
    session.start(root);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app
    let mut state = AppState::new(session);
    let result = run_app(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    result?;

    // Picker output goes to stdout once the terminal is ours again
    for path in &state.chosen {
        println!("{}", path.display());
    }
    tracing::info!(chosen = state.chosen.len(), "finished");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let theme = Theme::default();
    let event_handler = EventHandler::new(50); // 50ms tick rate

    loop {
        // Deliver finished loads and deletions
        state.poll();
        if state.should_quit {
            break;
        }

        terminal.draw(|frame| {
            let area = frame.area();
            let layout = AppLayout::new(area);

            // Background
            frame
                .buffer_mut()
                .set_style(area, Style::default().bg(theme.bg));

            // Update visible height for scrolling
            state.visible_height = layout.content.height as usize;

            Header::new(state, &theme).render(layout.header, frame.buffer_mut());
            StatusLine::new(state, &theme).render(layout.status, frame.buffer_mut());

            let view = state.view();
            match state.session.top() {
                Some(Screen::Loading { item }) => {
                    LoadingView::new(item, state.spinner_frame, &theme)
                        .render(layout.content, frame.buffer_mut());
                }
                Some(Screen::Directory { view_model, .. }) => {
                    ItemList::new(view_model, view.selected_index, view.scroll_offset, &theme)
                        .render(layout.content, frame.buffer_mut());
                }
                Some(Screen::File { view_model }) => {
                    FileDetails::new(view_model, &theme).render(layout.content, frame.buffer_mut());
                }
                Some(Screen::Error { item, message }) => {
                    ErrorView::new(item, message, &theme).render(layout.content, frame.buffer_mut());
                }
                None => {}
            }

            // Help overlay
            if state.mode == AppMode::Help {
                HelpView::new(&theme).render(area, frame.buffer_mut());
            }

            // Delete confirmation dialog
            if state.mode == AppMode::ConfirmDelete {
                let names = state.pending_delete_names();
                ConfirmDeleteView::new(&names, &theme).render(area, frame.buffer_mut());
            }

            Footer::new(state, &theme).render(layout.footer, frame.buffer_mut());
        })?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = handle_key(key, state.mode);
                state.handle_action(action);
            }
            AppEvent::Resize => {
                // Terminal will redraw on next loop
            }
            AppEvent::Tick => state.handle_action(app::Action::Tick),
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
