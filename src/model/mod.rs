//! In-memory tabular data model.
//!
//! A [`Dataset`] owns a header mapping (column id → [`Column`]) and a body of
//! rows (column id → [`Cell`]). Columns carry an ordinal that defines the
//! left-to-right output position; serialization always re-derives the order
//! by a stable sort on ordinal, so sparse or duplicate ordinals produced by
//! unusual [`Dataset::add_column`] arguments are resolved at write time
//! rather than rejected.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

/// Byte-order marker prepended to serialized output so that downstream
/// spreadsheet consumers detect UTF-8.
pub const BOM: char = '\u{feff}';

/// A header entry. Identity is the column id; the ordinal is the only
/// attribute mutated after creation (shifted by inserts), apart from the
/// output-exclusion flag and the marker fields set by transform rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column identifier, as spelled in the header row.
    pub id: String,
    /// Left-to-right output position.
    pub ordinal: usize,
    /// When set, the column is dropped from the serialized header and from
    /// every serialized row.
    pub exclude_from_output: bool,
    /// Marker set by the banner transform rule for period-formatted columns.
    pub period: bool,
    /// Marker set by the promotions transform rule for `*_VALUE` columns.
    pub value_column: bool,
}

impl Column {
    /// Creates a plain column at the given ordinal.
    pub fn new(id: impl Into<String>, ordinal: usize) -> Self {
        Self {
            id: id.into(),
            ordinal,
            exclude_from_output: false,
            period: false,
            value_column: false,
        }
    }
}

/// One cell of one body row. `raw_value` is immutable once parsed;
/// `output_value` is what gets serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// Id of the column this cell belongs to.
    pub column_id: String,
    /// Original parsed value.
    pub raw_value: String,
    /// Value emitted by [`Dataset::serialize`].
    pub output_value: String,
    /// Promotion tokens attached by the promotions transform rule.
    pub tokens: Option<Vec<String>>,
}

impl Cell {
    /// Creates a cell whose output value starts out equal to the raw value.
    pub fn new(column_id: impl Into<String>, raw_value: impl Into<String>) -> Self {
        let raw_value = raw_value.into();
        Self {
            column_id: column_id.into(),
            output_value: raw_value.clone(),
            raw_value,
            tokens: None,
        }
    }

    /// Creates the empty cell inserted into existing rows by
    /// [`Dataset::add_column`].
    pub fn empty(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            ..Self::default()
        }
    }
}

/// A record handed to a transform rule. The variant is the closed
/// header/body tag: rules receive headers once per column and body cells
/// once per cell, immediately after construction or column insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A header entry (kind = header).
    Header(Column),
    /// A body cell (kind = body).
    Body(Cell),
}

/// Injectable per-record transform hook. Rules may replace or mutate the
/// record (set exclusion flags, attach tokens) but must hand back the same
/// record kind they received; ordinal ordering is owned by the dataset.
pub type TransformRule = dyn Fn(Record) -> Record;

/// One body row: column id → cell.
pub type Row = BTreeMap<String, Cell>;

/// Size summary for a parsed input or serialized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Character count of the raw text.
    pub bytes: usize,
    /// Cell count of the first row.
    pub columns: usize,
    /// Row count, header included.
    pub rows: usize,
}

/// An ordinal-indexed table with a pluggable per-cell transform hook.
pub struct Dataset {
    /// Header mapping. Every row in `body` has exactly one cell per key,
    /// except rows that were parsed shorter than the header.
    pub headers: BTreeMap<String, Column>,
    /// Ordered body rows.
    pub body: Vec<Row>,
    transform: Option<Box<TransformRule>>,
}

impl Dataset {
    /// Builds a dataset from parsed grid rows. The first row becomes the
    /// header (ordinal = position); the remaining rows become the body. A
    /// repeated header id overwrites the earlier entry and is reported as a
    /// warning, not an error. The transform rule, when provided, is applied
    /// to every header entry and every body cell during construction.
    pub fn from_grid(rows: Vec<Vec<String>>, transform: Option<Box<TransformRule>>) -> Self {
        let mut dataset = Self {
            headers: BTreeMap::new(),
            body: Vec::new(),
            transform,
        };

        let mut rows = rows.into_iter();
        let header_row = rows.next().unwrap_or_default();

        // Ordinal → column id, used to route body cells of this grid.
        let mut ordinal_ids = Vec::with_capacity(header_row.len());
        for (ordinal, id) in header_row.into_iter().enumerate() {
            if let Some(previous) = dataset.headers.get(&id) {
                warn!(
                    column = %id,
                    previous_ordinal = previous.ordinal,
                    ordinal,
                    "duplicate header column detected"
                );
            }
            let column = dataset.run_header_rule(Column::new(id.clone(), ordinal));
            dataset.headers.insert(id.clone(), column);
            ordinal_ids.push(id);
        }

        for row in rows {
            let mut cells = Row::new();
            // A row shorter than the header simply lacks the trailing cells;
            // anything beyond the header width has no column and is dropped.
            for (id, value) in ordinal_ids.iter().zip(row) {
                let cell = dataset.run_body_rule(Cell::new(id.clone(), value));
                cells.insert(id.clone(), cell);
            }
            dataset.body.push(cells);
        }

        dataset
    }

    /// Inserts a new column at the requested ordinal. Existing columns at
    /// that ordinal or beyond are shifted one position right; every body row
    /// receives an empty cell for the new column. The transform rule is
    /// applied to the new header entry and to each inserted cell.
    pub fn add_column(&mut self, id: impl Into<String>, ordinal: usize) {
        let id = id.into();
        for column in self.headers.values_mut() {
            if column.ordinal >= ordinal {
                column.ordinal += 1;
            }
        }
        let column = self.run_header_rule(Column::new(id.clone(), ordinal));
        self.headers.insert(id.clone(), column);

        let mut updated = Vec::with_capacity(self.body.len());
        for mut row in std::mem::take(&mut self.body) {
            let cell = self.run_body_rule(Cell::empty(id.clone()));
            row.insert(id.clone(), cell);
            updated.push(row);
        }
        self.body = updated;
    }

    /// Deep-copies one body row for use as a template when a single source
    /// row expands into multiple output rows.
    pub fn clone_row(&self, row_index: usize) -> Row {
        self.body[row_index].clone()
    }

    /// Columns kept in the output, in serialization order: a stable sort on
    /// ordinal with excluded columns dropped.
    pub fn output_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.headers.values().collect();
        columns.sort_by_key(|column| column.ordinal);
        columns.retain(|column| !column.exclude_from_output);
        columns
    }

    /// Serializes the table back to text: header line, then one line per
    /// body row, cells joined with `,` and rows with `\n`, prefixed with a
    /// UTF-8 byte-order marker. Cells missing from short rows are skipped,
    /// not padded.
    pub fn serialize(&self) -> String {
        let columns = self.output_columns();

        let mut lines = Vec::with_capacity(self.body.len() + 1);
        let header: Vec<&str> = columns.iter().map(|column| column.id.as_str()).collect();
        lines.push(header.join(","));

        for row in &self.body {
            let cells: Vec<&str> = columns
                .iter()
                .filter_map(|column| row.get(&column.id))
                .map(|cell| cell.output_value.as_str())
                .collect();
            lines.push(cells.join(","));
        }

        let mut text = String::from(BOM);
        text.push_str(&lines.join("\n"));
        text
    }

    /// Size summary of serialized output text (BOM excluded from the count,
    /// matching what a downstream consumer sees as data).
    pub fn output_stats(&self, text: &str) -> Stats {
        let body = text.strip_prefix(BOM).unwrap_or(text);
        Stats {
            bytes: body.chars().count(),
            columns: self.output_columns().len(),
            rows: self.body.len() + 1,
        }
    }

    fn run_header_rule(&self, column: Column) -> Column {
        match &self.transform {
            Some(rule) => match rule(Record::Header(column)) {
                Record::Header(column) => column,
                Record::Body(cell) => {
                    panic!("transform rule returned a body cell for header '{}'", cell.column_id)
                }
            },
            None => column,
        }
    }

    fn run_body_rule(&self, cell: Cell) -> Cell {
        match &self.transform {
            Some(rule) => match rule(Record::Body(cell)) {
                Record::Body(cell) => cell,
                Record::Header(column) => {
                    panic!("transform rule returned a header for cell '{}'", column.id)
                }
            },
            None => cell,
        }
    }
}

/// Size summary of raw parsed grid rows.
pub fn grid_stats(text: &str, rows: &[Vec<String>]) -> Stats {
    Stats {
        bytes: text.chars().count(),
        columns: rows.first().map_or(0, Vec::len),
        rows: rows.len(),
    }
}
