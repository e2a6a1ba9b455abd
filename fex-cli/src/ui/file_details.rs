use fex_core::{AttributeValue, FileViewModel};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Padding, Widget},
};

use super::format_time;
use super::layout::{truncate_left, truncate_right};
use super::theme::Theme;

/// Details screen of a loaded file
pub struct FileDetails<'a> {
    view_model: &'a FileViewModel,
    theme: &'a Theme,
}

impl<'a> FileDetails<'a> {
    pub fn new(view_model: &'a FileViewModel, theme: &'a Theme) -> Self {
        Self { view_model, theme }
    }
}

impl Widget for FileDetails<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.view_model.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 4 || inner.width < 20 {
            return;
        }

        let width = inner.width as usize;
        let label_style = Style::default().fg(self.theme.fg_dim);
        let value_style = Style::default().fg(self.theme.fg);
        let mut y = inner.y;

        let path = self.view_model.path().to_string_lossy();
        buf.set_string(
            inner.x,
            y,
            truncate_left(&path, width),
            Style::default().fg(self.theme.fg_muted),
        );
        y += 2;

        let kind = self.view_model.preview_kind();
        buf.set_string(inner.x, y, format!("{:10}", "Kind"), label_style);
        buf.set_string(
            inner.x + 10,
            y,
            kind.label(),
            Style::default()
                .fg(self.theme.preview_color(kind))
                .add_modifier(Modifier::BOLD),
        );
        y += 1;

        for row in self.view_model.attributes() {
            let value = match &row.value {
                AttributeValue::Time(time) => format_time(*time),
                _ => row.size_text().unwrap_or_default(),
            };
            buf.set_string(inner.x, y, format!("{:10}", row.label), label_style);
            buf.set_string(inner.x + 10, y, value, value_style);
            y += 1;
        }

        let Some(excerpt) = self.view_model.text_excerpt() else {
            return;
        };
        y += 1;
        let bottom = inner.y + inner.height;
        if y >= bottom {
            return;
        }

        buf.set_string(inner.x, y, "Preview", label_style.add_modifier(Modifier::BOLD));
        y += 1;
        for line in excerpt.lines() {
            if y >= bottom {
                break;
            }
            let line = line.replace('\t', "    ");
            buf.set_string(inner.x, y, truncate_right(&line, width), value_style);
            y += 1;
        }
    }
}
