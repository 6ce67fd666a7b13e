//! src/model/list_query.rs
//! ============================================================================
//! # `QueryEngine`: search, filter and sort over an in-memory collection
//!
//! Pipeline: raw items → free-text search → predicate filters → stable sort.
//! The derived view is a list of indices into the owned collection and is
//! rebuilt in full by [`QueryEngine::recompute`]; setters only record state.
//!
//! Malformed configuration degrades instead of failing: an active filter
//! without a registered predicate is ignored, a search field the record does
//! not have never matches, and a missing sort value orders after every
//! present value in ascending order.

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use std::{cmp::Ordering, collections::HashMap, fmt, sync::Arc};
use tracing::{debug, instrument};

use crate::model::field::{FieldValue, Record};

/// Direction of the active sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        };
        write!(f, "{s}")
    }
}

/// Active sort; `key = None` keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<CompactString>,
    pub direction: SortDirection,
}

/// Caller-supplied test of one item against a filter's current value.
pub type FilterPredicate<T> = Arc<dyn Fn(&T, &Value) -> bool + Send + Sync>;

/// `null` and `""` mean "filter not set".
#[must_use]
pub fn is_active_filter(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Missing values sort after present ones; the direction flips the whole
/// comparison, ties keep their input order.
fn compare_field(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub struct QueryEngine<T> {
    items: Vec<T>,
    search_fields: SmallVec<[CompactString; 4]>,
    predicates: HashMap<CompactString, FilterPredicate<T>>,

    search_term: CompactString,
    filters: IndexMap<CompactString, Value>,
    sort: SortConfig,

    /// Indices into `items`, in display order.
    view: Vec<usize>,
}

impl<T: Record> QueryEngine<T> {
    /// Build an engine over `items`, searching the given field names.
    /// The derived view starts out as the full collection in input order.
    #[must_use]
    pub fn new<I, S>(items: Vec<T>, search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let view = (0..items.len()).collect();
        Self {
            items,
            search_fields: search_fields.into_iter().map(Into::into).collect(),
            predicates: HashMap::new(),
            search_term: CompactString::default(),
            filters: IndexMap::new(),
            sort: SortConfig::default(),
            view,
        }
    }

    /// Register the predicate backing the filter called `name`.
    #[must_use]
    pub fn with_predicate<F>(mut self, name: impl Into<CompactString>, predicate: F) -> Self
    where
        F: Fn(&T, &Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Replace the underlying collection. Call [`Self::recompute`] afterwards.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.view.clear();
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<CompactString>) {
        self.search_term = term.into();
    }

    #[must_use]
    pub fn filters(&self) -> &IndexMap<CompactString, Value> {
        &self.filters
    }

    /// Current value of one filter, if it has ever been set.
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&Value> {
        self.filters.get(name)
    }

    /// Set exactly one filter entry, leaving the others untouched.
    pub fn update_filter(&mut self, name: impl Into<CompactString>, value: Value) {
        self.filters.insert(name.into(), value);
    }

    /// Clear every filter and the search term. Sort is kept.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.search_term.clear();
    }

    #[must_use]
    pub const fn sort_config(&self) -> &SortConfig {
        &self.sort
    }

    /// Header-style toggle: same key flips direction, new key sorts ascending.
    pub fn sort(&mut self, key: &str) {
        if self.sort.key.as_deref() == Some(key) {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort.key = Some(CompactString::new(key));
            self.sort.direction = SortDirection::Asc;
        }
    }

    /// Apply an explicit key and direction.
    pub fn set_sort(&mut self, key: &str, direction: SortDirection) {
        self.sort.key = Some(CompactString::new(key));
        self.sort.direction = direction;
    }

    pub fn clear_sort(&mut self) {
        self.sort = SortConfig::default();
    }

    fn matches_search(&self, item: &T, needle: &str) -> bool {
        self.search_fields.iter().any(|field| {
            item.field(field)
                .is_some_and(|value| value.search_text().contains(needle))
        })
    }

    fn matches_filters(&self, item: &T) -> bool {
        self.filters
            .iter()
            .filter(|(_, value)| is_active_filter(value))
            .all(|(name, value)| {
                self.predicates
                    .get(name)
                    .is_none_or(|predicate| predicate(item, value))
            })
    }

    /// Rebuild the derived view from scratch. Returns `total_results`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            marker = "LIST_QUERY_RECOMPUTE",
            operation_type = "list_query",
            items = self.items.len(),
            search_len = self.search_term.len(),
            filters = self.filters.len(),
        )
    )]
    pub fn recompute(&mut self) -> usize {
        let needle = self.search_term.to_lowercase();

        let mut view: Vec<usize> = (0..self.items.len())
            .filter(|&idx| {
                let item = &self.items[idx];
                (needle.is_empty() || self.matches_search(item, &needle))
                    && self.matches_filters(item)
            })
            .collect();

        if let Some(key) = self.sort.key.as_deref() {
            let direction = self.sort.direction;
            let keys: HashMap<usize, Option<FieldValue>> = view
                .iter()
                .map(|&idx| (idx, self.items[idx].field(key)))
                .collect();

            view.sort_by(|a, b| {
                let ordering = compare_field(keys[a].as_ref(), keys[b].as_ref());
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        debug!(
            total_results = view.len(),
            sort_key = ?self.sort.key,
            direction = %self.sort.direction,
            "List query recomputed"
        );

        self.view = view;
        self.view.len()
    }

    /// Items that survived search and filters, in sorted order.
    pub fn filtered_and_sorted_items(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.view.iter().map(|&idx| &self.items[idx])
    }

    /// Same as [`Self::filtered_and_sorted_items`], collected.
    #[must_use]
    pub fn results(&self) -> Vec<&T> {
        self.filtered_and_sorted_items().collect()
    }

    #[must_use]
    pub fn total_results(&self) -> usize {
        self.view.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Row {
        name: &'static str,
        department: Option<&'static str>,
        level: i64,
    }

    impl Record for Row {
        fn field(&self, key: &str) -> Option<FieldValue> {
            match key {
                "name" => Some(self.name.into()),
                "department" => self.department.map(FieldValue::from),
                "level" => Some(self.level.into()),
                _ => None,
            }
        }
    }

    fn row(name: &'static str, department: Option<&'static str>, level: i64) -> Row {
        Row {
            name,
            department,
            level,
        }
    }

    fn names(engine: &QueryEngine<Row>) -> Vec<&'static str> {
        engine.filtered_and_sorted_items().map(|r| r.name).collect()
    }

    fn engine() -> QueryEngine<Row> {
        QueryEngine::new(
            vec![
                row("ana", Some("Engineering"), 3),
                row("bo", Some("Sales"), 1),
                row("cy", Some("Engineering Ops"), 2),
                row("di", None, 1),
            ],
            ["department"],
        )
        .with_predicate("min_level", |r: &Row, v: &Value| {
            v.as_i64().is_some_and(|min| r.level >= min)
        })
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut e = engine();
        e.set_search_term("eng");
        assert_eq!(e.recompute(), 2);
        assert_eq!(names(&e), vec!["ana", "cy"]);
    }

    #[test]
    fn test_missing_search_field_never_matches() {
        let mut e = engine();
        e.set_search_term("n");
        e.recompute();
        assert!(!names(&e).contains(&"di"));
    }

    #[test]
    fn test_unregistered_filter_is_ignored() {
        let mut e = engine();
        e.update_filter("nonexistent", json!("anything"));
        assert_eq!(e.recompute(), 4);
    }

    #[test]
    fn test_empty_filter_value_deactivates() {
        let mut e = engine();
        e.update_filter("min_level", json!(2));
        assert_eq!(e.recompute(), 2);

        e.update_filter("min_level", json!(""));
        assert_eq!(e.recompute(), 4);

        e.update_filter("min_level", Value::Null);
        assert_eq!(e.recompute(), 4);
    }

    #[test]
    fn test_update_filter_leaves_others() {
        let mut e = engine().with_predicate("dept", |r: &Row, v: &Value| {
            r.department == v.as_str()
        });
        e.update_filter("dept", json!("Engineering"));
        e.update_filter("min_level", json!(1));
        e.update_filter("min_level", json!(3));

        assert_eq!(e.filter("dept"), Some(&json!("Engineering")));
        assert_eq!(e.recompute(), 1);
        assert_eq!(names(&e), vec!["ana"]);
    }

    #[test]
    fn test_sort_toggle_semantics() {
        let mut e = engine();
        e.sort("name");
        assert_eq!(e.sort_config().direction, SortDirection::Asc);

        e.sort("name");
        assert_eq!(e.sort_config().key.as_deref(), Some("name"));
        assert_eq!(e.sort_config().direction, SortDirection::Desc);
        e.recompute();
        assert_eq!(names(&e), vec!["di", "cy", "bo", "ana"]);

        e.sort("level");
        assert_eq!(e.sort_config().direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        const NAMES: [&str; 12] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
        let items = NAMES
            .iter()
            .zip(0_i64..)
            .map(|(name, i)| row(name, None, i % 3))
            .collect();
        let mut e: QueryEngine<Row> = QueryEngine::new(items, ["name"]);

        e.set_sort("level", SortDirection::Asc);
        e.recompute();
        assert_eq!(
            names(&e),
            vec!["a", "d", "g", "j", "b", "e", "h", "k", "c", "f", "i", "l"]
        );

        e.set_sort("level", SortDirection::Desc);
        e.recompute();
        assert_eq!(
            names(&e),
            vec!["c", "f", "i", "l", "b", "e", "h", "k", "a", "d", "g", "j"]
        );
    }

    #[test]
    fn test_missing_sort_values_order_last() {
        let mut e = engine();
        e.set_sort("department", SortDirection::Asc);
        e.recompute();
        assert_eq!(names(&e), vec!["ana", "cy", "bo", "di"]);
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut e = engine();
        e.set_search_term("sales");
        e.update_filter("min_level", json!(1));
        e.sort("level");

        e.clear_filters();
        assert_eq!(e.search_term(), "");
        assert!(e.filters().is_empty());
        assert_eq!(e.sort_config().key.as_deref(), Some("level"));
        assert_eq!(e.recompute(), 4);
    }

    #[test]
    fn test_additional_constraints_never_grow_results() {
        let terms = ["", "e", "eng", "sales", "zzz"];
        let mins = [None, Some(1), Some(2), Some(3), Some(9)];

        for term in terms {
            let mut e = engine();
            let unfiltered = e.recompute();

            e.set_search_term(term);
            let searched = e.recompute();
            assert!(searched <= unfiltered);

            for min in mins.iter().flatten() {
                e.update_filter("min_level", json!(min));
                assert!(e.recompute() <= searched, "term={term} min={min}");
            }
        }
    }

    #[test]
    fn test_set_items_requires_recompute() {
        let mut e = engine();
        e.set_items(vec![row("zed", Some("Legal"), 5)]);
        assert_eq!(e.total_results(), 0);
        assert_eq!(e.recompute(), 1);
        assert_eq!(e.results()[0].name, "zed");
    }
}
