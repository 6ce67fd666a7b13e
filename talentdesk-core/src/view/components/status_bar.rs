//! src/view/components/status_bar.rs
//!
//! The status bar shows the page position and result counts of the active
//! screen on the left, the sort column in the middle and key hints on the
//! right.

use crate::{
    model::{data_table::PageSummary, list_query::SortConfig, ui_state::UIMode},
    view::theme,
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn position_text(summary: &PageSummary) -> String {
        let rows = match summary.showing {
            Some((start, end)) => format!("{start}-{end} of {}", summary.total_results),
            None => "no results".to_string(),
        };
        let filtered = if summary.total_results == summary.total_items {
            String::new()
        } else {
            format!(" (filtered from {})", summary.total_items)
        };
        format!(
            "Page {}/{} | {rows}{filtered}",
            summary.page, summary.total_pages
        )
    }

    pub fn sort_text(sort: &SortConfig) -> String {
        match &sort.key {
            Some(key) => format!("Sort: {key} {}", sort.direction.arrow()),
            None => "Unsorted".to_string(),
        }
    }

    pub const fn hints(mode: UIMode) -> &'static str {
        match mode {
            UIMode::Browse => "/ search  f filter  c clear  1-9 sort  ←/→ page  x/X dismiss  q quit",
            UIMode::Search => "Esc/Enter done  Backspace delete",
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        summary: &PageSummary,
        sort: &SortConfig,
        mode: UIMode,
    ) {
        let [left, middle, right] = Layout::horizontal([
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Fill(3),
        ])
        .areas(area);

        let style = Style::default().fg(theme::FOREGROUND).bg(theme::BACKGROUND);

        Paragraph::new(Self::position_text(summary))
            .style(style)
            .alignment(Alignment::Left)
            .render(left, frame.buffer_mut());

        Paragraph::new(Self::sort_text(sort))
            .style(style.fg(theme::YELLOW))
            .alignment(Alignment::Center)
            .render(middle, frame.buffer_mut());

        Paragraph::new(Self::hints(mode))
            .style(style.fg(theme::COMMENT))
            .alignment(Alignment::Right)
            .render(right, frame.buffer_mut());
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
