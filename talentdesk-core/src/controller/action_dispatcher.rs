//! src/controller/action_dispatcher.rs
//! ============================================================================
//! # ActionDispatcher: applies actions to screens, UI state and toasts
//!
//! Owns every piece of mutable console state. The collaborators it needs
//! (screens, notification queue, search debouncer, action channel) are handed
//! in at construction so tests can build one without a terminal.

use std::path::PathBuf;

use compact_str::{CompactString, format_compact};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    controller::{actions::Action, screen::TableScreen},
    model::{
        notifications::{NotificationCenter, NotificationOptions},
        records::Workspace,
        ui_state::{RedrawFlag, UIMode, UIState},
    },
    util::debounce::Debouncer,
    view::components::data_table::{header_y, row_at},
};

/// Debounced search input: `(epoch, tab, term)`. Clearing filters starts a
/// new epoch, and values from an older one are dropped.
pub type SearchInput = (u64, usize, CompactString);

pub struct ActionDispatcher {
    screens: Vec<Box<dyn TableScreen>>,
    ui: UIState,
    notifications: NotificationCenter,
    search: Debouncer<SearchInput>,
    search_epoch: u64,
    action_tx: UnboundedSender<Action>,
    data_file: Option<PathBuf>,
}

impl ActionDispatcher {
    pub fn new(
        screens: Vec<Box<dyn TableScreen>>,
        notifications: NotificationCenter,
        search: Debouncer<SearchInput>,
        action_tx: UnboundedSender<Action>,
        data_file: Option<PathBuf>,
    ) -> Self {
        Self {
            screens,
            ui: UIState::new(),
            notifications,
            search,
            search_epoch: 0,
            action_tx,
            data_file,
        }
    }

    #[must_use]
    pub const fn ui(&self) -> &UIState {
        &self.ui
    }

    pub const fn ui_mut(&mut self) -> &mut UIState {
        &mut self.ui
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    #[must_use]
    pub fn screens(&self) -> &[Box<dyn TableScreen>] {
        &self.screens
    }

    #[must_use]
    pub fn active_screen(&self) -> Option<&dyn TableScreen> {
        self.screens.get(self.ui.active_tab).map(AsRef::as_ref)
    }

    fn active_screen_mut(&mut self) -> Option<&mut Box<dyn TableScreen>> {
        self.screens.get_mut(self.ui.active_tab)
    }

    /// Apply one action. Returns `false` when the application should quit.
    #[instrument(level = "trace", skip_all, fields(marker = "ACTION_DISPATCH", action = ?action))]
    pub fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                info!(marker = "APP_QUIT", "Quit requested");
                return false;
            }

            Action::EnterSearch => {
                let term = self
                    .active_screen()
                    .map(|s| CompactString::new(s.search_term()))
                    .unwrap_or_default();
                self.ui.set_input(term);
                self.ui.enter_search();
            }

            Action::ExitSearch => {
                self.search.flush();
                self.ui.exit_search();
            }

            Action::InsertChar(ch) => {
                if self.ui.mode == UIMode::Search {
                    self.ui.insert_char(ch);
                    self.submit_search();
                }
            }

            Action::DeleteChar => {
                if self.ui.mode == UIMode::Search && self.ui.delete_char_before() {
                    self.submit_search();
                }
            }

            Action::CursorLeft => self.ui.move_cursor_left(),
            Action::CursorRight => self.ui.move_cursor_right(),

            Action::SearchSettled { epoch, tab, term } => {
                if epoch == self.search_epoch {
                    self.apply_search(tab, &term);
                } else {
                    trace!(epoch, current = self.search_epoch, "Dropping stale search");
                }
            }

            Action::NextPage => self.on_active(|s| s.next_page()),
            Action::PrevPage => self.on_active(|s| s.prev_page()),
            Action::FirstPage => self.on_active(|s| s.first_page()),
            Action::LastPage => self.on_active(|s| s.last_page()),
            Action::MoveUp => self.on_active(|s| s.move_selection(-1)),
            Action::MoveDown => self.on_active(|s| s.move_selection(1)),

            Action::ClickHeader(index) => self.click_header(index),

            Action::Click { x, y } => self.click(x, y),

            Action::ApplySort {
                tab,
                key,
                direction,
            } => {
                if let Some(screen) = self.screens.get_mut(tab) {
                    debug!(
                        marker = "SORT_APPLIED",
                        tab,
                        key = %key,
                        direction = %direction,
                        "Applying sort"
                    );
                    screen.apply_sort(&key, direction);
                    self.ui.request_redraw(RedrawFlag::Table);
                }
            }

            Action::CycleFilter => self.cycle_filter(),

            Action::ClearFilters => {
                self.search.cancel();
                self.search_epoch += 1;
                self.ui.clear_input();
                self.on_active(|s| s.clear_filters());
                self.notifications.info(
                    "Filters and search cleared",
                    NotificationOptions::default(),
                );
            }

            Action::NextTab => self.switch_tab(true),
            Action::PrevTab => self.switch_tab(false),

            Action::DismissNewest => {
                if let Some(id) = self.notifications.newest() {
                    self.notifications.remove_notification(&id);
                    self.ui.request_redraw(RedrawFlag::Notification);
                }
            }

            Action::DismissAll => {
                self.notifications.clear_all();
                self.ui.request_redraw(RedrawFlag::Notification);
            }

            Action::Reload => self.reload(),

            Action::WorkspaceLoaded(result) => self.workspace_loaded(result),

            Action::Resize(width, height) => {
                trace!(width, height, "Terminal resized");
                self.ui.request_redraw(RedrawFlag::All);
            }

            Action::Tick | Action::NoOp => {}
        }
        true
    }

    fn on_active(&mut self, f: impl FnOnce(&mut dyn TableScreen)) {
        if let Some(screen) = self.active_screen_mut() {
            f(screen.as_mut());
            self.ui.request_redraw(RedrawFlag::Table);
            self.ui.request_redraw(RedrawFlag::StatusBar);
        }
    }

    fn submit_search(&self) {
        self.search
            .submit((self.search_epoch, self.ui.active_tab, self.ui.input.clone()));
    }

    fn apply_search(&mut self, tab: usize, term: &str) {
        let Some(screen) = self.screens.get_mut(tab) else {
            warn!(tab, "Search settled for unknown screen");
            return;
        };
        if screen.set_search_term(term) {
            debug!(
                marker = "SEARCH_APPLIED",
                tab,
                term = %term,
                results = screen.summary().total_results,
                "Search term applied"
            );
            self.ui.request_redraw(RedrawFlag::Table);
        }
    }

    fn click_header(&mut self, index: usize) {
        let Some(screen) = self.active_screen_mut() else {
            return;
        };
        if screen.click_header(index).is_none() {
            trace!(index, "Header is not sortable");
        }
    }

    fn click(&mut self, x: u16, y: u16) {
        let area = self.ui.table_area;
        if area.is_empty() || !area.contains((x, y).into()) {
            return;
        }

        if y == header_y(area) {
            let column = self.active_screen().and_then(|s| s.column_at(area, x));
            if let Some(index) = column {
                self.click_header(index);
            }
            return;
        }

        let row = self
            .active_screen()
            .and_then(|s| row_at(area, y, s.selected()));
        if let Some(row) = row {
            self.on_active(|s| {
                s.select(row);
            });
        }
    }

    fn cycle_filter(&mut self) {
        let description = self.active_screen_mut().and_then(|s| s.cycle_filter());
        match description {
            Some(text) => {
                self.notifications.info(
                    &text,
                    NotificationOptions::default().title("Filter"),
                );
                self.ui.request_redraw(RedrawFlag::Table);
            }
            None => {
                self.notifications.warning(
                    "This view has no quick filter",
                    NotificationOptions::default(),
                );
            }
        }
    }

    fn switch_tab(&mut self, forward: bool) {
        let count = self.screens.len();
        if count == 0 {
            return;
        }
        let current = self.ui.active_tab;
        self.ui.active_tab = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };

        // Each screen keeps its own term; the search line follows the tab.
        let term = self
            .active_screen()
            .map(|s| CompactString::new(s.search_term()))
            .unwrap_or_default();
        self.ui.set_input(term);
        self.ui.request_redraw(RedrawFlag::All);
    }

    fn reload(&mut self) {
        let Some(path) = self.data_file.clone() else {
            let workspace = Box::new(Workspace::sample());
            self.workspace_loaded(Ok(workspace));
            return;
        };

        info!(marker = "WORKSPACE_RELOAD", path = %path.display(), "Reloading workspace");
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = Workspace::load(&path)
                .await
                .map(Box::new)
                .map_err(|e| format_compact!("{e}"));
            if tx.send(Action::WorkspaceLoaded(result)).is_err() {
                trace!("Action channel closed before reload finished");
            }
        });
    }

    fn workspace_loaded(&mut self, result: Result<Box<Workspace>, CompactString>) {
        match result {
            Ok(workspace) => {
                for screen in &mut self.screens {
                    screen.load(&workspace);
                }
                let message = format!(
                    "{} applications, {} jobs, {} users",
                    workspace.applications.len(),
                    workspace.jobs.len(),
                    workspace.users.len()
                );
                self.notifications.success(
                    &message,
                    NotificationOptions::default().title("Workspace loaded"),
                );
            }
            Err(reason) => {
                warn!(marker = "WORKSPACE_RELOAD_FAILED", reason = %reason, "Reload failed");
                self.notifications.error(
                    &reason,
                    NotificationOptions::default().title("Reload failed"),
                );
            }
        }
        self.ui.request_redraw(RedrawFlag::All);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{NotificationConfig, TableConfig},
        controller::screens::{APPLICATIONS_TAB, JOBS_TAB, build_screens},
        model::{list_query::SortDirection, notifications::NotificationKind},
        util::debounce::DebounceConfig,
    };
    use ratatui::layout::Rect;
    use std::{io::Write, time::Duration};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    struct Harness {
        dispatcher: ActionDispatcher,
        actions: UnboundedReceiver<Action>,
        settled: UnboundedReceiver<SearchInput>,
    }

    fn harness(data_file: Option<PathBuf>) -> Harness {
        let (action_tx, actions) = unbounded_channel();
        let (search, settled) = Debouncer::new(DebounceConfig::new(Duration::from_millis(300)));
        let screens = build_screens(&Workspace::sample(), &TableConfig::default(), &action_tx);
        let notifications = NotificationCenter::new(NotificationConfig::default()).unwrap();
        Harness {
            dispatcher: ActionDispatcher::new(screens, notifications, search, action_tx, data_file),
            actions,
            settled,
        }
    }

    impl Harness {
        /// Feed every queued internal action back into the dispatcher.
        fn drain(&mut self) {
            while let Ok(action) = self.actions.try_recv() {
                self.dispatcher.handle(action);
            }
        }

        fn active(&self) -> &dyn TableScreen {
            self.dispatcher.active_screen().unwrap()
        }
    }

    #[tokio::test]
    async fn test_quit_stops_loop() {
        let mut h = harness(None);
        assert!(h.dispatcher.handle(Action::Tick));
        assert!(!h.dispatcher.handle(Action::Quit));
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_is_debounced_into_one_search() {
        let mut h = harness(None);
        let total = h.active().summary().total_results;

        h.dispatcher.handle(Action::EnterSearch);
        for ch in "sales".chars() {
            h.dispatcher.handle(Action::InsertChar(ch));
            tokio::time::advance(Duration::from_millis(50)).await;
        }
        assert_eq!(h.active().search_term(), "", "nothing applied mid-burst");

        let (epoch, tab, term) = h.settled.recv().await.unwrap();
        assert_eq!((tab, term.as_str()), (APPLICATIONS_TAB, "sales"));
        assert!(h.settled.try_recv().is_err(), "only the final value");

        h.dispatcher.handle(Action::SearchSettled { epoch, tab, term });
        let filtered = h.active().summary();
        assert!(filtered.total_results < total);
        assert_eq!(filtered.page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_search_flushes_pending_term() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::EnterSearch);
        h.dispatcher.handle(Action::InsertChar('x'));
        h.dispatcher.handle(Action::ExitSearch);

        assert_eq!(h.dispatcher.ui().mode, UIMode::Browse);
        let (_, _, term) = h.settled.try_recv().unwrap();
        assert_eq!(term, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_search_settled_before_it() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::EnterSearch);
        for ch in "sales".chars() {
            h.dispatcher.handle(Action::InsertChar(ch));
        }
        let (epoch, tab, term) = h.settled.recv().await.unwrap();

        // Settled but not yet dispatched when the user clears
        h.dispatcher.handle(Action::ClearFilters);
        h.dispatcher.handle(Action::SearchSettled { epoch, tab, term });
        assert_eq!(h.active().search_term(), "");
        assert_eq!(h.active().summary().total_results, h.active().summary().total_items);

        // Typing after the clear still searches
        h.dispatcher.handle(Action::InsertChar('a'));
        let (epoch, tab, term) = h.settled.recv().await.unwrap();
        h.dispatcher.handle(Action::SearchSettled { epoch, tab, term });
        assert_eq!(h.active().search_term(), "a");
    }

    #[tokio::test]
    async fn test_keys_outside_search_mode_do_not_type() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::InsertChar('q'));
        assert!(h.dispatcher.ui().input.is_empty());
    }

    #[tokio::test]
    async fn test_header_click_round_trips_through_sort_callback() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::ClickHeader(1));
        assert_eq!(h.active().sort_config().key, None, "applied on next dispatch");

        h.drain();
        let sort = h.active().sort_config();
        assert_eq!(sort.key.as_deref(), Some("candidate_name"));
        assert_eq!(sort.direction, SortDirection::Asc);

        h.dispatcher.handle(Action::ClickHeader(1));
        h.drain();
        assert_eq!(h.active().sort_config().direction, SortDirection::Desc);
    }

    #[tokio::test]
    async fn test_mouse_click_on_header_and_row() {
        let mut h = harness(None);
        let area = Rect::new(0, 2, 120, 20);
        h.dispatcher.ui_mut().table_area = area;

        // First column starts after the border and the highlight symbol
        h.dispatcher.handle(Action::Click { x: 4, y: 3 });
        h.drain();
        assert_eq!(h.active().sort_config().key.as_deref(), Some("id"));

        h.dispatcher.handle(Action::Click { x: 10, y: 7 });
        assert_eq!(h.active().selected(), 2);

        h.dispatcher.handle(Action::Click { x: 10, y: 200 });
        assert_eq!(h.active().selected(), 2, "outside the table");
    }

    #[tokio::test]
    async fn test_mouse_click_on_scrolled_short_table() {
        let mut h = harness(None);
        // Room for four of the ten page rows
        h.dispatcher.ui_mut().table_area = Rect::new(0, 0, 120, 8);
        for _ in 0..6 {
            h.dispatcher.handle(Action::MoveDown);
        }
        assert_eq!(h.active().selected(), 6);

        // Rows 3..=6 are on screen; the top visible line is row 3
        h.dispatcher.handle(Action::Click { x: 10, y: 3 });
        assert_eq!(h.active().selected(), 3);

        // Clicking the bottom border selects nothing
        h.dispatcher.handle(Action::Click { x: 10, y: 7 });
        assert_eq!(h.active().selected(), 3);
    }

    #[tokio::test]
    async fn test_paging_and_tabs() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::NextPage);
        assert_eq!(h.active().summary().page, 2);

        h.dispatcher.handle(Action::LastPage);
        let summary = h.active().summary();
        assert_eq!(summary.page, summary.total_pages);

        h.dispatcher.handle(Action::NextTab);
        assert_eq!(h.dispatcher.ui().active_tab, JOBS_TAB);
        assert_eq!(h.active().summary().page, 1);

        h.dispatcher.handle(Action::PrevTab);
        h.dispatcher.handle(Action::PrevTab);
        assert_eq!(h.dispatcher.ui().active_tab, h.dispatcher.screens().len() - 1);
    }

    #[tokio::test]
    async fn test_cycle_and_clear_filters_toast() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::CycleFilter);
        assert_eq!(h.active().active_filters().len(), 1);

        let toasts = h.dispatcher.notifications().notifications();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Status: pending");

        h.dispatcher.handle(Action::ClearFilters);
        assert!(h.active().active_filters().is_empty());
        assert_eq!(h.dispatcher.notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_newest_then_all() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::CycleFilter);
        h.dispatcher.handle(Action::CycleFilter);
        h.dispatcher.handle(Action::CycleFilter);

        h.dispatcher.handle(Action::DismissNewest);
        let remaining = h.dispatcher.notifications().notifications();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[1].message, "Status: reviewing");

        h.dispatcher.handle(Action::DismissAll);
        assert!(h.dispatcher.notifications().is_empty());
        h.dispatcher.handle(Action::DismissNewest);
    }

    #[tokio::test]
    async fn test_reload_failure_surfaces_error_toast() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let mut h = harness(Some(file.path().to_path_buf()));

        h.dispatcher.handle(Action::Reload);
        let action = h.actions.recv().await.unwrap();
        h.dispatcher.handle(action);

        let toasts = h.dispatcher.notifications().notifications();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, NotificationKind::Error);
        assert_eq!(toasts[0].title.as_deref(), Some("Reload failed"));
    }

    #[tokio::test]
    async fn test_reload_without_file_uses_sample() {
        let mut h = harness(None);
        h.dispatcher.handle(Action::CycleFilter);
        h.dispatcher.handle(Action::DismissAll);

        h.dispatcher.handle(Action::Reload);
        let toasts = h.dispatcher.notifications().notifications();
        assert_eq!(toasts[0].kind, NotificationKind::Success);
        // Filters survive a reload; the collection is what changes
        assert_eq!(h.active().active_filters().len(), 1);
    }
}
