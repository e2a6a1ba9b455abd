use fex_core::Item;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Padding, Widget},
};

use super::layout::truncate_left;
use super::theme::Theme;

/// Braille spinner characters
const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn spinner(frame: usize) -> char {
    SPINNER[frame % SPINNER.len()]
}

/// Placeholder shown while a screen's item loads
pub struct LoadingView<'a> {
    item: &'a Item,
    spinner_frame: usize,
    theme: &'a Theme,
}

impl<'a> LoadingView<'a> {
    pub fn new(item: &'a Item, spinner_frame: usize, theme: &'a Theme) -> Self {
        Self {
            item,
            spinner_frame,
            theme,
        }
    }
}

impl Widget for LoadingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 || inner.width < 20 {
            return;
        }

        let spinner_style = Style::default()
            .fg(self.theme.blue)
            .add_modifier(Modifier::BOLD);
        buf.set_string(
            inner.x,
            inner.y,
            spinner(self.spinner_frame).to_string(),
            spinner_style,
        );
        buf.set_string(
            inner.x + 2,
            inner.y,
            format!("Loading {}...", self.item.name()),
            Style::default().fg(self.theme.fg),
        );

        let path = self.item.path().to_string_lossy();
        buf.set_string(
            inner.x,
            inner.y + 1,
            truncate_left(&path, inner.width.saturating_sub(2) as usize),
            Style::default().fg(self.theme.fg_dim),
        );
    }
}

/// Placeholder shown when a screen's item failed to load
pub struct ErrorView<'a> {
    item: &'a Item,
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ErrorView<'a> {
    pub fn new(item: &'a Item, message: &'a str, theme: &'a Theme) -> Self {
        Self {
            item,
            message,
            theme,
        }
    }
}

impl Widget for ErrorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.red))
            .padding(Padding::horizontal(1));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 3 || inner.width < 20 {
            return;
        }

        let width = inner.width as usize;
        buf.set_string(
            inner.x,
            inner.y,
            format!("Could not open {}", self.item.name()),
            Style::default()
                .fg(self.theme.red)
                .add_modifier(Modifier::BOLD),
        );

        // Wrap the message over the remaining rows
        let chars: Vec<char> = self.message.chars().collect();
        for (row, chunk) in chars
            .chunks(width.max(1))
            .take(inner.height.saturating_sub(3) as usize)
            .enumerate()
        {
            let line: String = chunk.iter().collect();
            buf.set_string(
                inner.x,
                inner.y + 2 + row as u16,
                line,
                Style::default().fg(self.theme.fg_dim),
            );
        }

        buf.set_string(
            inner.x,
            inner.y + inner.height - 1,
            "Backspace to go back",
            Style::default().fg(self.theme.fg_muted),
        );
    }
}
