use fex_core::format_count;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::AppState;

use super::layout::truncate_left;
use super::progress::spinner;
use super::theme::Theme;

/// Header widget showing title, breadcrumb, and status
pub struct Header<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn status(&self) -> String {
        let Some(vm) = self.state.directory() else {
            return String::new();
        };

        let mut status = format!(
            "{} item{}  sort:{}",
            format_count(vm.items().len()),
            if vm.items().len() == 1 { "" } else { "s" },
            vm.sort_mode().label()
        );
        if vm.is_editing() {
            status.push_str(&format!("  {} selected", format_count(vm.selected_items().len())));
        }
        status
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 1 {
            return;
        }

        let title_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, "FEX", title_style);
        buf.set_string(
            area.x + 5,
            area.y,
            "─",
            Style::default().fg(self.theme.border),
        );

        // Status (right-aligned)
        let deleting = self.state.session.is_deletion_in_progress();
        let status = if deleting {
            format!("{} deleting...", spinner(self.state.spinner_frame))
        } else {
            self.status()
        };
        let status_len = status.chars().count() as u16;
        let status_style = if deleting {
            Style::default().fg(self.theme.yellow)
        } else {
            Style::default().fg(self.theme.fg_dim)
        };

        let breadcrumb = self.state.session.breadcrumb().join(" › ");
        let max_len = area.width.saturating_sub(status_len + 10) as usize;
        buf.set_string(
            area.x + 7,
            area.y,
            truncate_left(&breadcrumb, max_len),
            Style::default().fg(self.theme.fg),
        );

        if status_len + 2 < area.width {
            let status_x = area.x + area.width - status_len - 2;
            buf.set_string(status_x, area.y, &status, status_style);
        }
    }
}
