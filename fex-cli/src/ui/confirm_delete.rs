use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use super::layout::{centered_rect, truncate_right};
use super::theme::Theme;

const MAX_LISTED: usize = 5;

/// Delete confirmation dialog for the current selection
pub struct ConfirmDeleteView<'a> {
    names: &'a [String],
    theme: &'a Theme,
}

impl<'a> ConfirmDeleteView<'a> {
    pub fn new(names: &'a [String], theme: &'a Theme) -> Self {
        Self { names, theme }
    }
}

impl Widget for ConfirmDeleteView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.names.len();
        let shown = count.min(MAX_LISTED);
        let has_more = count > MAX_LISTED;

        // header + names + "...and N more" + blank + hints, plus borders and padding
        let content_lines = 1 + shown + usize::from(has_more) + 1 + 1;
        let dialog_area = centered_rect(50, content_lines as u16 + 4, area);

        Clear.render(dialog_area, buf);

        let block = Block::default()
            .title(" Delete? ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.red))
            .style(Style::default().bg(self.theme.bg_surface))
            .padding(Padding::uniform(1));

        let inner = block.inner(dialog_area);
        block.render(dialog_area, buf);

        if inner.height < 2 {
            return;
        }

        let text_style = Style::default().fg(self.theme.fg);
        let name_style = Style::default()
            .fg(self.theme.yellow)
            .add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(self.theme.fg_dim);
        let key_style = Style::default()
            .fg(self.theme.green)
            .add_modifier(Modifier::BOLD);

        let max_w = (inner.width as usize).saturating_sub(2);
        let mut row = inner.y;

        let header = format!(
            "Delete {} item{}:",
            count,
            if count == 1 { "" } else { "s" }
        );
        buf.set_string(inner.x, row, &header, text_style);
        row += 1;

        for name in self.names.iter().take(MAX_LISTED) {
            buf.set_string(inner.x + 1, row, truncate_right(name, max_w), name_style);
            row += 1;
        }

        if has_more {
            let more_text = format!("  ...and {} more", count - MAX_LISTED);
            buf.set_string(inner.x, row, &more_text, dim_style);
        }

        // Action hints at bottom
        let hints_y = inner.y + inner.height - 1;
        buf.set_string(inner.x, hints_y, "[y]", key_style);
        buf.set_string(inner.x + 4, hints_y, "Yes, delete", text_style);
        buf.set_string(inner.x + 18, hints_y, "[n]", key_style);
        buf.set_string(inner.x + 22, hints_y, "Cancel", text_style);
    }
}
