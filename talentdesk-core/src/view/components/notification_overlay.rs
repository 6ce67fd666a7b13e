//! src/view/components/notification_overlay.rs
use crate::model::notifications::Notification;
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    symbols,
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Wrap},
};
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 5;

/// Stacked toasts in the top-right corner, newest on top.
pub struct NotificationOverlay;

impl NotificationOverlay {
    pub fn new() -> Self {
        debug!(
            marker = "UI_COMPONENT_INIT",
            component = "NotificationOverlay",
            "Creating notification overlay component"
        );
        Self
    }

    /// Areas for `count` toasts inside `area`; toasts that don't fit are dropped.
    pub fn toast_areas(area: Rect, count: usize) -> Vec<Rect> {
        let width = TOAST_WIDTH.min(area.width);
        let x = area.x + area.width.saturating_sub(width + 1);

        let mut areas = Vec::with_capacity(count);
        let mut y = area.y.saturating_add(1);
        for _ in 0..count {
            if y.saturating_add(TOAST_HEIGHT) > area.bottom() {
                break;
            }
            areas.push(Rect::new(x, y, width, TOAST_HEIGHT));
            y += TOAST_HEIGHT;
        }
        areas
    }

    /// `visible` comes oldest first; it is drawn newest first.
    #[instrument(
        level = "trace",
        skip_all,
        fields(
            marker = "NOTIFICATION_RENDER",
            operation_type = "notification_render",
            count = visible.len(),
        )
    )]
    pub fn render(&self, frame: &mut Frame<'_>, visible: &[Notification], area: Rect, now: Instant) {
        let areas = Self::toast_areas(area, visible.len());
        if areas.len() < visible.len() {
            warn!(
                shown = areas.len(),
                queued = visible.len(),
                "Terminal too short for every visible toast"
            );
        }

        for (toast, toast_area) in visible.iter().rev().zip(areas) {
            self.render_toast(frame, toast, toast_area, now);
        }
    }

    fn render_toast(&self, frame: &mut Frame<'_>, toast: &Notification, area: Rect, now: Instant) {
        frame.render_widget(Clear, area);

        let (accent, icon) = theme::notification_palette(toast.kind);
        let title = toast
            .title
            .as_ref()
            .map_or_else(|| toast.kind.to_string(), ToString::to_string);

        trace!(
            id = %toast.id,
            kind = ?toast.kind,
            title = %title,
            "Rendering toast"
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {icon} {title} "))
            .title_style(Style::default().fg(accent).bold())
            .border_style(Style::default().fg(accent))
            .style(Style::default().bg(theme::BACKGROUND));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(inner);

        let message = Paragraph::new(toast.message.as_str())
            .style(Style::default().fg(theme::FOREGROUND))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(message, layout[0]);

        match toast.progress(now) {
            Some(ratio) => {
                let gauge = LineGauge::default()
                    .filled_style(Style::default().fg(accent))
                    .unfilled_style(Style::default().fg(theme::CURRENT_LINE))
                    .line_set(symbols::line::THICK)
                    .label("")
                    .ratio(ratio);
                frame.render_widget(gauge, layout[1]);
            }
            None => {
                let hint = Paragraph::new("x to dismiss")
                    .style(theme::placeholder_style())
                    .alignment(Alignment::Right);
                frame.render_widget(hint, layout[1]);
            }
        }
    }
}

impl Default for NotificationOverlay {
    fn default() -> Self {
        Self::new()
    }
}
