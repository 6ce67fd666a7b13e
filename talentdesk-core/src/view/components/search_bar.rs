//! src/view/components/search_bar.rs
//! Search line with cursor, plus the active filters of the current screen.
use crate::model::ui_state::UIMode;
use crate::view::theme;
use compact_str::CompactString;
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub struct SearchBar;

impl SearchBar {
    pub fn new() -> Self {
        Self
    }

    /// Input text with a `│` at the cursor while editing.
    pub fn input_text(input: &str, cursor: usize, mode: UIMode) -> String {
        let mut text = input.to_string();
        if mode == UIMode::Search && text.is_char_boundary(cursor) {
            text.insert(cursor, '│');
        }
        text
    }

    pub fn filter_line(filters: &[(CompactString, String)]) -> Line<'static> {
        if filters.is_empty() {
            return Line::default();
        }
        let mut spans = vec![Span::raw(" ")];
        for (label, value) in filters {
            spans.push(Span::styled(
                format!("{label}: "),
                Style::default().fg(theme::COMMENT),
            ));
            spans.push(Span::styled(
                format!("{value} "),
                Style::default().fg(theme::ORANGE).bold(),
            ));
        }
        Line::from(spans).right_aligned()
    }

    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        input: &str,
        cursor: usize,
        mode: UIMode,
        filters: &[(CompactString, String)],
    ) {
        let editing = mode == UIMode::Search;
        let title = if editing { " Search " } else { " Search (/) " };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title(Self::filter_line(filters))
            .border_style(theme::border_style(editing))
            .style(theme::base_style());

        let text = Self::input_text(input, cursor, mode);
        let paragraph = if text.is_empty() {
            Paragraph::new("type / to search").style(theme::placeholder_style())
        } else {
            Paragraph::new(text).style(Style::default().fg(theme::FOREGROUND))
        };

        frame.render_widget(paragraph.block(block), area);
    }
}

impl Default for SearchBar {
    fn default() -> Self {
        Self::new()
    }
}
