use std::fmt;
use std::ops::Range;

// ---------------------------------------------------------------------------
// Cell – a single loaded spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it comes out of a loader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Empty => Ok(()),
        }
    }
}

impl Cell {
    /// Guess the type of a raw text field (CSV and similar sources).
    pub fn guess(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        if s == "true" || s == "false" {
            return Cell::Bool(s == "true");
        }
        Cell::Text(s.to_string())
    }

    /// Missing values and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Whether the cell holds a number as loaded (no text parsing).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_)) || matches!(self, Cell::Float(v) if !v.is_nan())
    }

    /// Numeric coercion: numbers pass through, text is parsed, the rest fails.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if !v.is_nan() => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            _ => None,
        }
    }

    /// Text used when the cell acts as a label or category.
    pub fn label(&self) -> String {
        self.to_string().trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// RawTable – one sheet as loaded
// ---------------------------------------------------------------------------

/// A sheet exactly as loaded: a header row plus rows of typed cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table, padding short rows with [`Cell::Empty`].
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    /// Position of the first column with this exact header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Iterate over the cells of one column.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// A column is numeric when every non-empty cell holds a number and at
    /// least one cell does.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen = false;
        for cell in self.column(idx) {
            if cell.is_empty() {
                continue;
            }
            if !cell.is_numeric() {
                return false;
            }
            seen = true;
        }
        seen
    }
}

// ---------------------------------------------------------------------------
// Table – normalized numeric matrix indexed by identifier labels
// ---------------------------------------------------------------------------

/// A numeric table: one label per row, one name per data column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Name of the identifier column the labels came from.
    pub index_name: String,
    pub labels: Vec<String>,
    pub columns: Vec<String>,
    /// Row-major values, `values[row][col]`.
    pub values: Vec<Vec<f64>>,
}

impl Table {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of the first row carrying `label`.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Largest value in the whole table, `None` when there are no numbers.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Copy of a contiguous block of rows.
    pub fn slice_rows(&self, rows: Range<usize>) -> Table {
        Table {
            index_name: self.index_name.clone(),
            labels: self.labels[rows.clone()].to_vec(),
            columns: self.columns.clone(),
            values: self.values[rows].to_vec(),
        }
    }

    /// Copy of the first `n` rows (or all of them when shorter).
    pub fn head(&self, n: usize) -> Table {
        self.slice_rows(0..n.min(self.n_rows()))
    }
}
