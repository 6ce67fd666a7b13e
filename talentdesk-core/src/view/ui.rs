//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the whole console from the
//! dispatcher's state: dataset tabs, search line, table,
//! status bar and the toast stack on top.

use std::time::{Duration, Instant as StdInstant};

use ratatui::{
    prelude::*,
    widgets::{Block, Tabs},
};
use tokio::time::Instant;
use tracing::{instrument, warn};

use crate::{
    controller::action_dispatcher::ActionDispatcher,
    model::ui_state::UIMode,
    view::{
        components::{
            notification_overlay::NotificationOverlay, search_bar::SearchBar,
            status_bar::StatusBar,
        },
        theme,
    },
};

const SLOW_FRAME: Duration = Duration::from_millis(16);

/// ---------------------------------------------------------------------------
/// Renderer struct (contains only caches + stats)
/// ---------------------------------------------------------------------------
pub struct UIRenderer {
    cache: LayoutCache,
    search_bar: SearchBar,
    status_bar: StatusBar,
    toasts: NotificationOverlay,
    pub stats: RenderStats,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    areas: Option<FrameAreas>,
    hit: u64,
    miss: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAreas {
    pub tabs: Rect,
    pub search: Rect,
    pub table: Rect,
    pub status: Rect,
}

impl FrameAreas {
    pub fn split(screen: Rect) -> Self {
        let [tabs, search, table, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(screen);
        Self {
            tabs,
            search,
            table,
            status,
        }
    }
}

#[derive(Default)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl UIRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayoutCache::default(),
            search_bar: SearchBar::new(),
            status_bar: StatusBar::new(),
            toasts: NotificationOverlay::new(),
            stats: RenderStats::default(),
        }
    }

    fn areas(&mut self, screen: Rect) -> FrameAreas {
        if self.cache.screen == screen
            && let Some(areas) = self.cache.areas
        {
            self.cache.hit += 1;
            return areas;
        }
        self.cache.miss += 1;
        self.cache.screen = screen;
        let areas = FrameAreas::split(screen);
        self.cache.areas = Some(areas);
        areas
    }

    /// Draw one frame. Returns the table area for mouse hit-testing.
    #[instrument(level = "trace", skip_all, fields(marker = "UI_RENDER", operation_type = "frame_render"))]
    pub fn render(&mut self, f: &mut Frame<'_>, app: &ActionDispatcher, now: Instant) -> Rect {
        let start = StdInstant::now();
        let areas = self.areas(f.area());
        let ui = app.ui();

        f.render_widget(Block::default().style(theme::base_style()), f.area());

        let titles: Vec<Line> = app
            .screens()
            .iter()
            .map(|s| Line::from(format!(" {} ({}) ", s.title(), s.summary().total_results)))
            .collect();
        let tabs = Tabs::new(titles)
            .select(ui.active_tab)
            .style(Style::default().fg(theme::COMMENT))
            .highlight_style(Style::default().fg(theme::PURPLE).bold())
            .divider("│");
        f.render_widget(tabs, areas.tabs);

        if let Some(screen) = app.active_screen() {
            let filters = screen.active_filters();
            self.search_bar.render(
                f,
                areas.search,
                &ui.input,
                ui.input_cursor,
                ui.mode,
                &filters,
            );
            screen.render(f, areas.table);
            self.status_bar.render(
                f,
                areas.status,
                &screen.summary(),
                &screen.sort_config(),
                ui.mode,
            );
        } else {
            self.search_bar
                .render(f, areas.search, "", 0, UIMode::Browse, &[]);
        }

        let visible = app.notifications().visible();
        if !visible.is_empty() {
            self.toasts.render(f, &visible, f.area(), now);
        }

        ui.increment_frame();
        ui.clear_redraw();

        let elapsed = start.elapsed();
        self.stats.frames += 1;
        self.stats.total += elapsed;
        if elapsed > SLOW_FRAME {
            self.stats.slow += 1;
            warn!(
                marker = "UI_RENDER_SLOW",
                render_time_us = elapsed.as_micros(),
                "Slow frame"
            );
        }

        areas.table
    }
}
