//! src/model/data_table.rs
//! ============================================================================
//! # `TableModel`: query engine + pagination for one list view
//!
//! Mutators record state; [`TableModel::refresh`] reruns the query and pulls
//! the page back into range. With `reset_on_change` (the default) a new
//! search term, filter value or collection also returns to page 1 so the view
//! never sits on a page past the end of a shrunken result.

use compact_str::CompactString;
use serde_json::Value;

use crate::{
    config::TableConfig,
    model::{
        field::Record,
        list_query::{QueryEngine, SortConfig, SortDirection},
        pagination::Pagination,
    },
};

/// Footer numbers for the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub total_items: usize,
    /// 1-based first/last row shown, `None` when the page is empty
    pub showing: Option<(usize, usize)>,
    pub has_prev: bool,
    pub has_next: bool,
}

pub struct TableModel<T> {
    engine: QueryEngine<T>,
    pagination: Pagination,
    reset_on_change: bool,
}

impl<T: Record> TableModel<T> {
    #[must_use]
    pub fn new(engine: QueryEngine<T>, config: &TableConfig) -> Self {
        let mut model = Self {
            engine,
            pagination: Pagination::new(config.items_per_page),
            reset_on_change: config.reset_page_on_filter_change,
        };
        model.refresh();
        model
    }

    #[must_use]
    pub const fn engine(&self) -> &QueryEngine<T> {
        &self.engine
    }

    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn changed(&mut self) {
        if self.reset_on_change {
            self.pagination.reset();
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.engine.set_items(items);
        self.changed();
    }

    /// Returns false when the term is unchanged and nothing was reset.
    pub fn set_search_term(&mut self, term: &str) -> bool {
        if self.engine.search_term() == term {
            return false;
        }
        self.engine.set_search_term(term);
        self.changed();
        true
    }

    pub fn update_filter(&mut self, name: impl Into<CompactString>, value: Value) {
        self.engine.update_filter(name, value);
        self.changed();
    }

    pub fn clear_filters(&mut self) {
        self.engine.clear_filters();
        self.changed();
    }

    pub fn sort(&mut self, key: &str) {
        self.engine.sort(key);
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) {
        self.engine.set_sort(key, direction);
    }

    #[must_use]
    pub const fn sort_config(&self) -> &SortConfig {
        self.engine.sort_config()
    }

    /// Recompute the derived list and clamp the page. Returns total results.
    pub fn refresh(&mut self) -> usize {
        let total = self.engine.recompute();
        self.pagination.clamp(total);
        total
    }

    #[must_use]
    pub fn total_results(&self) -> usize {
        self.engine.total_results()
    }

    pub fn go_to_page(&mut self, page: i64) -> usize {
        let total = self.total_results();
        self.pagination.go_to_page(page, total)
    }

    pub fn next_page(&mut self) -> usize {
        let total = self.total_results();
        self.pagination.next_page(total)
    }

    pub fn prev_page(&mut self) -> usize {
        let total = self.total_results();
        self.pagination.prev_page(total)
    }

    pub fn first_page(&mut self) -> usize {
        self.pagination.first_page()
    }

    pub fn last_page(&mut self) -> usize {
        let total = self.total_results();
        self.pagination.last_page(total)
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.pagination.set_items_per_page(items_per_page);
    }

    /// Rows of the current page, in display order.
    #[must_use]
    pub fn page_items(&self) -> Vec<&T> {
        let range = self.pagination.index_range(self.total_results());
        self.engine
            .filtered_and_sorted_items()
            .skip(range.start)
            .take(range.len())
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> PageSummary {
        let total = self.total_results();
        PageSummary {
            page: self.pagination.current_page(),
            total_pages: self.pagination.total_pages(total),
            total_results: total,
            total_items: self.engine.items().len(),
            showing: self.pagination.display_range(total),
            has_prev: self.pagination.has_prev(),
            has_next: self.pagination.has_next(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::FieldValue;
    use serde_json::json;

    struct Candidate {
        name: String,
        stage: &'static str,
    }

    impl Record for Candidate {
        fn field(&self, key: &str) -> Option<FieldValue> {
            match key {
                "name" => Some(self.name.as_str().into()),
                "stage" => Some(self.stage.into()),
                _ => None,
            }
        }
    }

    fn model(config: &TableConfig) -> TableModel<Candidate> {
        let items = (0..23)
            .map(|i| Candidate {
                name: format!("candidate {i:02}"),
                stage: if i % 4 == 0 { "offer" } else { "screen" },
            })
            .collect();
        let engine = QueryEngine::new(items, ["name"]).with_predicate(
            "stage",
            |c: &Candidate, v: &Value| v.as_str() == Some(c.stage),
        );
        TableModel::new(engine, config)
    }

    #[test]
    fn test_pages_over_filtered_results() {
        let mut table = model(&TableConfig::default());
        assert_eq!(table.summary().total_pages, 3);

        table.go_to_page(5);
        let page = table.page_items();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].name, "candidate 20");
        assert_eq!(table.summary().showing, Some((21, 23)));
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut table = model(&TableConfig::default());
        table.go_to_page(3);

        table.update_filter("stage", json!("offer"));
        table.refresh();

        let summary = table.summary();
        assert_eq!(summary.page, 1);
        assert_eq!(summary.total_results, 6);
        assert_eq!(summary.total_items, 23);
        assert_eq!(table.page_items().len(), 6);
    }

    #[test]
    fn test_without_reset_page_is_clamped() {
        let config = TableConfig {
            reset_page_on_filter_change: false,
            ..TableConfig::default()
        };
        let mut table = model(&config);
        table.go_to_page(3);

        table.set_search_term("candidate 1");
        table.refresh();

        // 10 matches → one page; clamp instead of an empty page 3
        assert_eq!(table.summary().page, 1);
        assert_eq!(table.page_items().len(), 10);
    }

    #[test]
    fn test_clearing_filter_restores_rows() {
        let mut table = model(&TableConfig::default());
        table.update_filter("stage", json!("offer"));
        assert_eq!(table.refresh(), 6);

        table.update_filter("stage", json!(""));
        assert_eq!(table.refresh(), 23);
    }

    #[test]
    fn test_sort_does_not_reset_page() {
        let mut table = model(&TableConfig::default());
        table.go_to_page(2);

        table.sort("name");
        table.sort("name");
        table.refresh();

        assert_eq!(table.summary().page, 2);
        assert_eq!(table.sort_config().direction, SortDirection::Desc);
        assert_eq!(table.page_items()[0].name, "candidate 12");
    }

    #[test]
    fn test_unchanged_search_term_is_noop() {
        let mut table = model(&TableConfig::default());
        table.go_to_page(2);
        assert!(!table.set_search_term(""));
        assert_eq!(table.summary().page, 2);
    }
}
