use std::cmp::Ordering;

use serde::Serialize;

use crate::search_query::{self, ColumnKeys};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Stable key used by `key:value` filters. Toggle columns have none.
    pub key: Option<String>,
    pub label: String,
    /// Not rendered in the current view. Still filterable by key.
    #[serde(skip)]
    pub hidden: bool,
}

impl Column {
    pub fn keyed(key: &str, label: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            label: label.to_string(),
            hidden: false,
        }
    }

    pub fn unkeyed(label: &str) -> Self {
        Self {
            key: None,
            label: label.to_string(),
            hidden: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<String>,
    #[serde(skip)]
    pub visible: bool,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            visible: true,
        }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Rendered cells joined the way a table row reads: tab separated.
    pub fn text(&self, columns: &impl ColumnKeys) -> String {
        self.cells
            .iter()
            .enumerate()
            .filter(|(index, _)| columns.is_rendered(*index))
            .map(|(_, cell)| cell.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl ColumnKeys for Vec<Column> {
    fn column_key(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|column| column.key.as_deref())
    }

    fn column_count(&self) -> usize {
        self.len()
    }

    fn is_rendered(&self, index: usize) -> bool {
        self.get(index).map_or(true, |column| !column.hidden)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Which column was sorted last and in which direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    /// Sorting the same column twice flips the direction; a new column starts
    /// ascending.
    pub fn next(self, column: usize) -> Self {
        let direction = if self.column == Some(column) {
            self.direction.reversed()
        } else {
            SortDirection::Ascending
        };
        Self {
            column: Some(column),
            direction,
        }
    }
}

/// Case-insensitive first, raw text as the tie-break.
fn compare_cells(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Clone, Debug, Default)]
pub struct TableView {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    sort: SortState,
}

impl TableView {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            sort: SortState::default(),
        }
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn sort_by_column(&mut self, column: usize) {
        if column >= self.columns.len() {
            log::warn!("cannot sort by column {column}, table has {}", self.columns.len());
            return;
        }

        self.sort = self.sort.next(column);
        let direction = self.sort.direction;

        self.rows.sort_by(|a, b| {
            let ordering = compare_cells(
                a.cell(column).unwrap_or_default(),
                b.cell(column).unwrap_or_default(),
            );
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// Sort by a keyed column. Returns `None` when no column has that key.
    pub fn sort_by_key(&mut self, key: &str) -> Option<SortDirection> {
        let column = self.columns.resolve_column(key)?;
        self.sort_by_column(column);
        Some(self.sort.direction)
    }

    /// Re-run the search box against every row.
    pub fn apply_search(&mut self, search: &str) {
        let query = search_query::parse_search_query(search);
        search_query::apply_filter(&mut self.rows, &query, &self.columns);
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| row.visible)
    }
}

impl ColumnKeys for TableView {
    fn column_key(&self, index: usize) -> Option<&str> {
        self.columns.column_key(index)
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn is_rendered(&self, index: usize) -> bool {
        self.columns.is_rendered(index)
    }
}
