use fex_core::Screen;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::{AppMode, AppState};

use super::theme::Theme;

/// Footer widget showing keyboard hints for what is currently possible
pub struct Footer<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Footer<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        match self.state.mode {
            AppMode::Help => vec![("Esc", "Close help"), ("q", "Close help")],
            AppMode::ConfirmDelete => vec![("y", "Yes"), ("n", "Cancel")],
            AppMode::Searching => vec![("Enter", "Keep"), ("Esc", "Clear"), ("↑↓", "Navigate")],
            AppMode::Browsing => match self.state.session.top() {
                Some(Screen::Directory { view_model, .. }) => {
                    let mut hints = vec![("↑↓", "Navigate"), ("Enter", "Open")];
                    if view_model.is_edit_action_enabled() {
                        hints.push(("v", if view_model.is_editing() { "Done" } else { "Edit" }));
                    }
                    if view_model.is_editing() {
                        hints.push(("Space", "Select"));
                    }
                    if view_model.is_select_action_enabled() {
                        hints.push(("c", "Choose"));
                    }
                    if view_model.is_delete_action_enabled() {
                        hints.push(("d", "Delete"));
                    }
                    hints.extend([("/", "Search"), ("s", "Sort"), ("?", "Help"), ("q", "Quit")]);
                    hints
                }
                _ => vec![("Bksp", "Back"), ("?", "Help"), ("q", "Quit")],
            },
        }
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let hints = self.hints();
        let key_style = Style::default()
            .fg(self.theme.fg)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(self.theme.fg_dim);
        let sep_style = Style::default().fg(self.theme.border);

        let mut x = area.x + 1;
        for (i, (key, desc)) in hints.iter().enumerate() {
            let needed = key.chars().count() + 1 + desc.len();
            if x as usize + needed >= (area.x + area.width) as usize {
                break;
            }

            buf.set_string(x, area.y, *key, key_style);
            x += key.chars().count() as u16 + 1;

            buf.set_string(x, area.y, *desc, desc_style);
            x += desc.len() as u16;

            if i < hints.len() - 1 {
                buf.set_string(x, area.y, "  │  ", sep_style);
                x += 5;
            }
        }
    }
}

/// Line under the header: search prompt or the last error
pub struct StatusLine<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> StatusLine<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < 1 {
            return;
        }

        if let Some(message) = &self.state.error_message {
            buf.set_string(
                area.x + 1,
                area.y,
                message,
                Style::default().fg(self.theme.red),
            );
            return;
        }

        if self.state.directory().is_none() {
            return;
        }
        let query = self.state.view().search_input;
        let query = query.as_str();
        let searching = self.state.mode == AppMode::Searching;
        if !searching && query.is_empty() {
            return;
        }

        let prompt_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, "/", prompt_style);
        buf.set_string(area.x + 3, area.y, query, Style::default().fg(self.theme.fg));
        if searching {
            let cursor_x = area.x + 3 + query.chars().count() as u16;
            buf.set_string(cursor_x, area.y, "▏", Style::default().fg(self.theme.fg_dim));
        }
    }
}
