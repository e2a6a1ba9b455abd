mod confirm_delete;
mod file_details;
mod footer;
mod header;
mod help;
mod item_list;
mod layout;
mod progress;
mod theme;

use std::time::SystemTime;

use chrono::{DateTime, Local};

pub use confirm_delete::ConfirmDeleteView;
pub use file_details::FileDetails;
pub use footer::{Footer, StatusLine};
pub use header::Header;
pub use help::HelpView;
pub use item_list::ItemList;
pub use layout::AppLayout;
pub use progress::{ErrorView, LoadingView};
pub use theme::Theme;

/// Local date and time, minute precision
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
