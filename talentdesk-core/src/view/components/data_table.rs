//! src/view/components/data_table.rs
//! ============================================================================
//! # `DataTable`: generic tabular renderer
//!
//! Draws rows that were already searched, filtered, sorted and paginated
//! upstream. One row per item, one cell per [`Column`]; a column's custom
//! renderer wins over the value's display form. The sort arrow mirrors the
//! engine's `SortConfig` (see [`DataTable::sync_indicator`]); header clicks
//! only report `(key, next_direction)` through the `on_sort` callback.

use compact_str::CompactString;
use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
};
use tracing::{debug, trace};

use crate::{
    model::{
        field::{FieldValue, Record},
        list_query::{SortConfig, SortDirection},
    },
    view::theme,
};

const HIGHLIGHT_SYMBOL: &str = "▶ ";
const COLUMN_SPACING: u16 = 1;

/// Custom cell text from the field value (if any) and the whole item.
pub type CellRenderer<T> = Box<dyn Fn(Option<&FieldValue>, &T) -> String + Send + Sync>;

/// Receives `(key, next_direction)` when a sortable header is clicked.
pub type SortCallback = Box<dyn FnMut(&str, SortDirection) + Send>;

/// Header row y-coordinate for a table drawn into `area`.
#[must_use]
pub const fn header_y(area: Rect) -> u16 {
    area.y.saturating_add(1)
}

/// y-coordinate of the first data row: border, header, header margin.
#[must_use]
pub const fn first_row_y(area: Rect) -> u16 {
    area.y.saturating_add(3)
}

/// Number of data rows that fit between the header and the bottom border.
#[must_use]
pub const fn visible_rows(area: Rect) -> usize {
    let bottom = area.y.saturating_add(area.height).saturating_sub(1);
    bottom.saturating_sub(first_row_y(area)) as usize
}

/// First row drawn when `selected` must stay on screen. Rows above it are
/// scrolled out of view.
#[must_use]
pub const fn row_offset(area: Rect, selected: usize) -> usize {
    let visible = visible_rows(area);
    if visible == 0 {
        return 0;
    }
    selected.saturating_sub(visible - 1)
}

/// Page row under terminal row `y`, accounting for the scroll offset.
#[must_use]
pub fn row_at(area: Rect, y: u16, selected: usize) -> Option<usize> {
    let first = first_row_y(area);
    let line = usize::from(y.checked_sub(first)?);
    (line < visible_rows(area)).then(|| row_offset(area, selected) + line)
}

pub struct Column<T> {
    pub key: CompactString,
    pub label: CompactString,
    pub sortable: bool,
    pub width: Constraint,
    render: Option<CellRenderer<T>>,
}

impl<T> Column<T> {
    #[must_use]
    pub fn new(key: impl Into<CompactString>, label: impl Into<CompactString>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: false,
            width: Constraint::Fill(1),
            render: None,
        }
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub const fn width(mut self, width: Constraint) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&FieldValue>, &T) -> String + Send + Sync + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    indicator: Option<(CompactString, SortDirection)>,
    on_sort: Option<SortCallback>,
    title: CompactString,
    empty_message: CompactString,
}

impl<T: Record> DataTable<T> {
    #[must_use]
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            indicator: None,
            on_sort: None,
            title: CompactString::default(),
            empty_message: CompactString::const_new("No records to show"),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<CompactString>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_empty_message(mut self, message: impl Into<CompactString>) -> Self {
        self.empty_message = message.into();
        self
    }

    #[must_use]
    pub fn on_sort<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str, SortDirection) + Send + 'static,
    {
        self.on_sort = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    #[must_use]
    pub fn indicator(&self) -> Option<(&str, SortDirection)> {
        self.indicator.as_ref().map(|(k, d)| (k.as_str(), *d))
    }

    /// Mirror the engine's sort so the arrow matches what is displayed.
    pub fn sync_indicator(&mut self, sort: &SortConfig) {
        self.indicator = sort.key.clone().map(|key| (key, sort.direction));
    }

    #[must_use]
    pub fn cell_text(&self, column: &Column<T>, item: &T) -> String {
        let value = item.field(&column.key);
        match &column.render {
            Some(render) => render(value.as_ref(), item),
            None => value.map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    /// Cell strings for each row; a single placeholder row when `data` is empty.
    #[must_use]
    pub fn row_texts(&self, data: &[&T]) -> Vec<Vec<String>> {
        if data.is_empty() {
            return vec![vec![self.empty_message.to_string()]];
        }
        data.iter()
            .map(|item| {
                self.columns
                    .iter()
                    .map(|column| self.cell_text(column, item))
                    .collect()
            })
            .collect()
    }

    #[must_use]
    pub fn header_labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| match self.indicator() {
                Some((key, direction)) if key == column.key => {
                    format!("{} {}", column.label, direction.arrow())
                }
                _ => column.label.to_string(),
            })
            .collect()
    }

    /// Click on header `index`: same column flips, another column starts
    /// ascending. Non-sortable or out-of-range headers are ignored.
    pub fn click_header(&mut self, index: usize) -> Option<(CompactString, SortDirection)> {
        let column = self.columns.get(index).filter(|c| c.sortable)?;
        let key = column.key.clone();

        let next = match self.indicator() {
            Some((current, direction)) if current == key => direction.toggled(),
            _ => SortDirection::Asc,
        };

        debug!(
            marker = "TABLE_HEADER_CLICK",
            column = %key,
            direction = %next,
            "Sortable header clicked"
        );

        self.indicator = Some((key.clone(), next));
        if let Some(callback) = self.on_sort.as_mut() {
            callback(&key, next);
        }
        Some((key, next))
    }

    /// Inner area minus the highlight symbol gutter: where cells start.
    fn cells_area(area: Rect) -> Rect {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let symbol = u16::try_from(HIGHLIGHT_SYMBOL.chars().count()).unwrap_or(0);
        let [_, cells] =
            Layout::horizontal([Constraint::Length(symbol), Constraint::Fill(1)]).areas(inner);
        cells
    }

    /// Full-width line for the empty-state message, spanning every column.
    /// `None` when the table is too short to show a row.
    #[must_use]
    pub fn placeholder_area(area: Rect) -> Option<Rect> {
        let cells = Self::cells_area(area);
        let y = first_row_y(area);
        (y < cells.bottom() && !cells.is_empty()).then(|| Rect::new(cells.x, y, cells.width, 1))
    }

    fn column_rects(&self, area: Rect) -> Vec<Rect> {
        let columns = Self::cells_area(area);

        Layout::horizontal(self.columns.iter().map(|c| c.width))
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(columns)
            .to_vec()
    }

    /// Column under terminal column `x`, for mouse hit-testing.
    #[must_use]
    pub fn column_at(&self, area: Rect, x: u16) -> Option<usize> {
        self.column_rects(area)
            .iter()
            .position(|rect| x >= rect.x && x < rect.x.saturating_add(rect.width))
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, data: &[&T], selected: Option<usize>) {
        trace!(rows = data.len(), "Rendering data table");

        let header = Row::new(self.header_labels())
            .style(theme::header_style())
            .bottom_margin(1);

        // The empty-state message is drawn over the whole row below, not
        // squeezed into the first column's width.
        let rows: Vec<Row> = if data.is_empty() {
            Vec::new()
        } else {
            self.row_texts(data)
                .into_iter()
                .map(|cells| Row::new(cells.into_iter().map(Cell::from)))
                .collect()
        };

        let widths: Vec<Constraint> = self.columns.iter().map(|c| c.width).collect();

        let selected = selected.filter(|_| !data.is_empty());
        let mut state = TableState::default()
            .with_offset(row_offset(area, selected.unwrap_or(0)))
            .with_selected(selected);

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title))
                    .title_style(Style::default().fg(theme::PURPLE).bold())
                    .border_style(theme::border_style(true))
                    .style(theme::base_style()),
            )
            .row_highlight_style(theme::selected_row_style())
            .highlight_symbol(HIGHLIGHT_SYMBOL)
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut state);

        if data.is_empty()
            && let Some(line) = Self::placeholder_area(area)
        {
            frame.render_widget(
                Paragraph::new(self.empty_message.as_str()).style(theme::placeholder_style()),
                line,
            );
        }
    }
}
