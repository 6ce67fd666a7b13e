//! src/controller/screen.rs
//! ============================================================================
//! # Screens: one table model + one renderer per dataset
//!
//! The dispatcher drives every dataset through the object-safe
//! [`TableScreen`] trait so it never needs to know the record type.

use compact_str::CompactString;
use ratatui::{Frame, layout::Rect};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, trace};

use crate::{
    config::TableConfig,
    controller::actions::Action,
    model::{
        data_table::{PageSummary, TableModel},
        field::Record,
        list_query::{QueryEngine, SortConfig, SortDirection, is_active_filter},
        records::Workspace,
    },
    view::components::data_table::DataTable,
};

/// Pulls a screen's collection out of a loaded workspace.
pub type Extractor<T> = fn(&Workspace) -> Vec<T>;

/// Values the `f` key steps through for one filter; after the last value the
/// filter switches off again.
#[derive(Debug, Clone)]
pub struct FilterCycle {
    pub name: CompactString,
    pub label: CompactString,
    options: Vec<Value>,
    position: Option<usize>,
}

impl FilterCycle {
    pub fn new(
        name: impl Into<CompactString>,
        label: impl Into<CompactString>,
        options: impl IntoIterator<Item = Value>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            options: options.into_iter().collect(),
            position: None,
        }
    }

    /// Step to the next value; `Value::Null` means the filter is off.
    pub fn advance(&mut self) -> Value {
        self.position = match self.position {
            None if !self.options.is_empty() => Some(0),
            Some(i) if i + 1 < self.options.len() => Some(i + 1),
            _ => None,
        };
        self.current().cloned().unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Value> {
        self.position.and_then(|i| self.options.get(i))
    }

    pub fn reset(&mut self) {
        self.position = None;
    }
}

/// Display form of a filter value.
#[must_use]
pub fn filter_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `on_sort` callback that reports header clicks back to the dispatcher.
pub fn sort_emitter(
    tab: usize,
    tx: UnboundedSender<Action>,
) -> impl FnMut(&str, SortDirection) + Send + 'static {
    move |key, direction| {
        let action = Action::ApplySort {
            tab,
            key: key.into(),
            direction,
        };
        if tx.send(action).is_err() {
            trace!(tab, "Action channel closed; sort request dropped");
        }
    }
}

pub trait TableScreen: Send {
    fn title(&self) -> &str;

    /// Replace the collection from a freshly loaded workspace.
    fn load(&mut self, workspace: &Workspace);

    fn search_term(&self) -> &str;

    /// Returns false when the term was already applied.
    fn set_search_term(&mut self, term: &str) -> bool;

    /// Advance the primary filter. Returns a human description of the new
    /// state, or `None` if the screen has no primary filter.
    fn cycle_filter(&mut self) -> Option<String>;

    fn clear_filters(&mut self);

    /// Active filters as `(label, value)` for the search bar.
    fn active_filters(&self) -> Vec<(CompactString, String)>;

    fn click_header(&mut self, index: usize) -> Option<(CompactString, SortDirection)>;

    fn apply_sort(&mut self, key: &str, direction: SortDirection);

    fn sort_config(&self) -> SortConfig;

    fn next_page(&mut self);

    fn prev_page(&mut self);

    fn first_page(&mut self);

    fn last_page(&mut self);

    fn move_selection(&mut self, delta: isize);

    /// Select row `row` of the current page; out-of-range rows are ignored.
    fn select(&mut self, row: usize) -> bool;

    fn selected(&self) -> usize;

    fn summary(&self) -> PageSummary;

    fn column_at(&self, area: Rect, x: u16) -> Option<usize>;

    fn render(&self, frame: &mut Frame<'_>, area: Rect);
}

pub struct Screen<T> {
    title: CompactString,
    model: TableModel<T>,
    table: DataTable<T>,
    filter: Option<FilterCycle>,
    extract: Extractor<T>,
    selected: usize,
}

impl<T: Record + Send + 'static> Screen<T> {
    pub fn new(
        title: impl Into<CompactString>,
        engine: QueryEngine<T>,
        table: DataTable<T>,
        extract: Extractor<T>,
        config: &TableConfig,
    ) -> Self {
        let model = TableModel::new(engine, config);
        let mut table = table;
        table.sync_indicator(model.sort_config());
        Self {
            title: title.into(),
            model,
            table,
            filter: None,
            extract,
            selected: 0,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterCycle) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub const fn model(&self) -> &TableModel<T> {
        &self.model
    }

    /// Recompute, keep the arrow in sync and pull the selection onto the page.
    fn refresh(&mut self) {
        let total = self.model.refresh();
        self.table.sync_indicator(self.model.sort_config());
        self.clamp_selection();
        trace!(screen = %self.title, total, "Screen refreshed");
    }

    fn clamp_selection(&mut self) {
        let rows = self.model.page_items().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}

impl<T: Record + Send + 'static> TableScreen for Screen<T> {
    fn title(&self) -> &str {
        &self.title
    }

    #[instrument(level = "debug", skip_all, fields(marker = "SCREEN_LOAD", screen = %self.title))]
    fn load(&mut self, workspace: &Workspace) {
        let items = (self.extract)(workspace);
        debug!(items = items.len(), "Replacing screen collection");
        self.model.set_items(items);
        self.selected = 0;
        self.refresh();
    }

    fn search_term(&self) -> &str {
        self.model.engine().search_term()
    }

    fn set_search_term(&mut self, term: &str) -> bool {
        if !self.model.set_search_term(term) {
            return false;
        }
        self.selected = 0;
        self.refresh();
        true
    }

    fn cycle_filter(&mut self) -> Option<String> {
        let filter = self.filter.as_mut()?;
        let value = filter.advance();
        let description = if is_active_filter(&value) {
            format!("{}: {}", filter.label, filter_value_text(&value))
        } else {
            format!("{}: any", filter.label)
        };
        let name = filter.name.clone();

        self.model.update_filter(name, value);
        self.selected = 0;
        self.refresh();
        Some(description)
    }

    fn clear_filters(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
        self.model.clear_filters();
        self.selected = 0;
        self.refresh();
    }

    fn active_filters(&self) -> Vec<(CompactString, String)> {
        self.model
            .engine()
            .filters()
            .iter()
            .filter(|(_, value)| is_active_filter(value))
            .map(|(name, value)| {
                let label = match &self.filter {
                    Some(f) if &f.name == name => f.label.clone(),
                    _ => name.clone(),
                };
                (label, filter_value_text(value))
            })
            .collect()
    }

    fn click_header(&mut self, index: usize) -> Option<(CompactString, SortDirection)> {
        self.table.click_header(index)
    }

    fn apply_sort(&mut self, key: &str, direction: SortDirection) {
        self.model.set_sort(key, direction);
        self.refresh();
    }

    fn sort_config(&self) -> SortConfig {
        self.model.sort_config().clone()
    }

    fn next_page(&mut self) {
        self.model.next_page();
        self.selected = 0;
    }

    fn prev_page(&mut self) {
        self.model.prev_page();
        self.selected = 0;
    }

    fn first_page(&mut self) {
        self.model.first_page();
        self.selected = 0;
    }

    fn last_page(&mut self) {
        self.model.last_page();
        self.selected = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp_selection();
    }

    fn select(&mut self, row: usize) -> bool {
        if row >= self.model.page_items().len() {
            return false;
        }
        self.selected = row;
        true
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn summary(&self) -> PageSummary {
        self.model.summary()
    }

    fn column_at(&self, area: Rect, x: u16) -> Option<usize> {
        self.table.column_at(area, x)
    }

    fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let rows = self.model.page_items();
        self.table.render(frame, area, &rows, Some(self.selected));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_cycle_wraps_to_off() {
        let mut cycle = FilterCycle::new("status", "Status", [json!("open"), json!("closed")]);
        assert_eq!(cycle.current(), None);
        assert_eq!(cycle.advance(), json!("open"));
        assert_eq!(cycle.advance(), json!("closed"));
        assert_eq!(cycle.advance(), Value::Null);
        assert_eq!(cycle.advance(), json!("open"));

        cycle.reset();
        assert_eq!(cycle.current(), None);
    }

    #[test]
    fn test_empty_filter_cycle_stays_off() {
        let mut cycle = FilterCycle::new("x", "X", []);
        assert_eq!(cycle.advance(), Value::Null);
        assert_eq!(cycle.advance(), Value::Null);
    }

    #[test]
    fn test_filter_value_text() {
        assert_eq!(filter_value_text(&json!("open")), "open");
        assert_eq!(filter_value_text(&json!(true)), "true");
        assert_eq!(filter_value_text(&json!(7.5)), "7.5");
    }

    #[tokio::test]
    async fn test_sort_emitter_sends_apply_sort() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut emit = sort_emitter(2, tx);
        emit("title", SortDirection::Desc);

        match rx.recv().await {
            Some(Action::ApplySort { tab, key, direction }) => {
                assert_eq!(tab, 2);
                assert_eq!(key, "title");
                assert_eq!(direction, SortDirection::Desc);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
