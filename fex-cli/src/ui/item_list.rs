use fex_core::DirectoryContentViewModel;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use super::format_time;
use super::layout::truncate_right;
use super::theme::Theme;

const DATE_WIDTH: usize = 16;

/// Listing of the directory on top of the stack
pub struct ItemList<'a> {
    view_model: &'a DirectoryContentViewModel,
    selected_index: usize,
    scroll_offset: usize,
    theme: &'a Theme,
}

impl<'a> ItemList<'a> {
    pub fn new(
        view_model: &'a DirectoryContentViewModel,
        selected_index: usize,
        scroll_offset: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            view_model,
            selected_index,
            scroll_offset,
            theme,
        }
    }
}

impl Widget for ItemList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 30 {
            return;
        }

        let items = self.view_model.items();
        if items.is_empty() {
            let text = if self.view_model.search_query().is_empty() {
                "Empty directory"
            } else {
                "No matches"
            };
            buf.set_string(
                area.x + 2,
                area.y,
                text,
                Style::default().fg(self.theme.fg_muted),
            );
            return;
        }

        let editing = self.view_model.is_editing();
        let marker_width = if editing { 4 } else { 0 };
        let name_width =
            (area.width as usize).saturating_sub(DATE_WIDTH + marker_width + 6);

        for (i, item) in items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(area.height as usize)
        {
            let y = area.y + (i - self.scroll_offset) as u16;
            let is_cursor = i == self.selected_index;
            let is_selected = self.view_model.is_selected(i);

            // Three-state: cursor (selection_bg), selected (bg_highlight), normal
            let bg = if is_cursor {
                self.theme.selection_bg
            } else if is_selected {
                self.theme.bg_highlight
            } else {
                self.theme.bg
            };
            let row_style = if is_cursor {
                Style::default().bg(bg).fg(self.theme.selection_fg)
            } else {
                Style::default().bg(bg).fg(self.theme.fg)
            };

            // Clear the row
            for x in 0..area.width {
                buf.set_string(area.x + x, y, " ", row_style);
            }

            let mut x = area.x + 1;

            if editing {
                let marker = if is_selected { "[▪]" } else { "[ ]" };
                let marker_style = if is_cursor {
                    row_style
                } else {
                    row_style.fg(self.theme.purple)
                };
                buf.set_string(x, y, marker, marker_style);
                x += marker_width as u16;
            }

            // Icon
            let icon_style = if is_cursor {
                row_style
            } else {
                row_style.fg(self.theme.icon_color(item.kind()))
            };
            buf.set_string(x, y, item.kind().icon(), icon_style);
            x += 3;

            // Name
            let name_style = if item.is_directory() {
                row_style.add_modifier(Modifier::BOLD)
            } else {
                row_style
            };
            buf.set_string(x, y, truncate_right(&item.name(), name_width), name_style);

            // Modification time (right-aligned)
            let date = format_time(item.modified());
            let date_x = area.x + area.width - DATE_WIDTH as u16 - 1;
            let date_style = if is_cursor {
                row_style
            } else {
                row_style.fg(self.theme.fg_muted)
            };
            buf.set_string(date_x, y, date, date_style);
        }
    }
}
