use super::parser::{Filter, ParsedQuery};
use crate::table::Row;

/// Maps column positions to the stable keys filters refer to.
pub trait ColumnKeys {
    fn column_key(&self, index: usize) -> Option<&str>;
    fn column_count(&self) -> usize;

    /// Whether the cell at `index` is part of the row's rendered text. Free
    /// text terms skip hidden cells; `key:value` filters don't.
    fn is_rendered(&self, _index: usize) -> bool {
        true
    }

    /// First column carrying `key`.
    fn resolve_column(&self, key: &str) -> Option<usize> {
        (0..self.column_count()).find(|&index| self.column_key(index) == Some(key))
    }
}

/// Filters paired with the column they apply to. Filters on unknown keys are
/// dropped here and never touch a row.
fn resolve_filters<'q>(query: &'q ParsedQuery, columns: &impl ColumnKeys) -> Vec<(usize, &'q Filter)> {
    query
        .filters
        .iter()
        .filter_map(|filter| match columns.resolve_column(&filter.key) {
            Some(index) => Some((index, filter)),
            None => {
                log::debug!("filter key {:?} matches no column, ignoring", filter.key);
                None
            }
        })
        .collect()
}

fn passes(row: &Row, terms: &[String], filters: &[(usize, &Filter)], columns: &impl ColumnKeys) -> bool {
    if !terms.is_empty() {
        let row_text = row.text(columns).to_lowercase();
        if terms.iter().any(|term| !row_text.contains(term.as_str())) {
            return false;
        }
    }

    filters.iter().all(|(index, filter)| {
        let cell = row.cell(*index).unwrap_or_default().to_lowercase();
        cell.contains(filter.value.as_str()) != filter.negated
    })
}

/// Indices of the rows that survive the query, in row order.
pub fn visible_rows(rows: &[Row], query: &ParsedQuery, columns: &impl ColumnKeys) -> Vec<usize> {
    let filters = resolve_filters(query, columns);
    rows.iter()
        .enumerate()
        .filter(|(_, row)| passes(row, &query.terms, &filters, columns))
        .map(|(index, _)| index)
        .collect()
}

/// Show every row, then hide the ones the query rejects.
pub fn apply_filter(rows: &mut [Row], query: &ParsedQuery, columns: &impl ColumnKeys) {
    let visible = visible_rows(rows, query, columns);
    for (index, row) in rows.iter_mut().enumerate() {
        row.visible = visible.binary_search(&index).is_ok();
    }
}
