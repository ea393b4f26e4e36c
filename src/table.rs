use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    /// Column letter used in a tabular column spec.
    pub fn letter(self) -> char {
        match self {
            Align::Left => 'l',
            Align::Center => 'c',
            Align::Right => 'r',
        }
    }
}

/// Per-column layout. A fixed `width` (e.g. `"3cm"`) overrides `align`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub align: Align,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
}

/// How a table is scaled relative to the page text width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthMode {
    #[default]
    Natural,
    FitToPage,
    CustomScale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStyle {
    #[default]
    Default,
    Booktabs,
    Striped,
    Minimal,
}

/// A rectangular grid of cells with per-cell background colors.
///
/// The grids are private so their shape can only change through
/// [`add_row`](Table::add_row), [`remove_row`](Table::remove_row),
/// [`add_column`](Table::add_column) and [`remove_column`](Table::remove_column),
/// which always resize `cells`, `cell_colors` and `columns` together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct Table {
    cells: Vec<Vec<String>>,
    cell_colors: Vec<Vec<Option<String>>>,
    columns: Vec<ColumnSpec>,
    pub caption: String,
    pub label: String,
    pub has_header: bool,
    pub width_mode: WidthMode,
    pub max_width_factor: f64,
    pub h_padding: String,
    pub style: TableStyle,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl Table {
    /// Create an empty `rows` x `cols` table. Both dimensions are clamped to at least 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            cells: vec![vec![String::new(); cols]; rows],
            cell_colors: vec![vec![None; cols]; rows],
            columns: vec![ColumnSpec::default(); cols],
            caption: "Table caption".to_string(),
            label: "table1".to_string(),
            has_header: true,
            width_mode: WidthMode::Natural,
            max_width_factor: 1.0,
            h_padding: "0.5em".to_string(),
            style: TableStyle::Default,
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column_mut(&mut self, col: usize) -> Option<&mut ColumnSpec> {
        self.columns.get_mut(col)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Replace the text of one cell. Returns `false` if the address is outside the grid.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = text.into();
                true
            }
            None => false,
        }
    }

    pub fn cell_color(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_colors.get(row)?.get(col)?.as_deref()
    }

    /// Set or clear the color tag of one cell. Returns `false` if the address
    /// is outside the grid.
    pub fn set_cell_color(&mut self, row: usize, col: usize, color: Option<String>) -> bool {
        match self.cell_colors.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(slot) => {
                *slot = color;
                true
            }
            None => false,
        }
    }

    /// Rows in order, each as its cell texts alongside their color tags.
    pub fn rows_iter(&self) -> impl Iterator<Item = (&[String], &[Option<String>])> {
        self.cells
            .iter()
            .zip(&self.cell_colors)
            .map(|(cells, colors)| (cells.as_slice(), colors.as_slice()))
    }

    /// Append an empty, uncolored row at the bottom.
    pub fn add_row(&mut self) {
        let cols = self.cols();
        self.cells.push(vec![String::new(); cols]);
        self.cell_colors.push(vec![None; cols]);
    }

    /// Drop the last row. The table never shrinks below one row.
    pub fn remove_row(&mut self) -> bool {
        if self.rows() <= 1 {
            return false;
        }
        self.cells.pop();
        self.cell_colors.pop();
        true
    }

    /// Append an empty, uncolored, center-aligned column on the right.
    pub fn add_column(&mut self) {
        for row in &mut self.cells {
            row.push(String::new());
        }
        for row in &mut self.cell_colors {
            row.push(None);
        }
        self.columns.push(ColumnSpec::default());
    }

    /// Drop the rightmost column. The table never shrinks below one column.
    pub fn remove_column(&mut self) -> bool {
        if self.cols() <= 1 {
            return false;
        }
        for row in &mut self.cells {
            row.pop();
        }
        for row in &mut self.cell_colors {
            row.pop();
        }
        self.columns.pop();
        true
    }
}

/// One colored cell in the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CellColor {
    row: usize,
    col: usize,
    color: String,
}

/// Serialized form of [`Table`]; the grid shape is checked when converting back.
///
/// Colors are stored sparsely, only for cells that have one.
#[derive(Serialize, Deserialize)]
struct RawTable {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cell_colors: Vec<CellColor>,
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    has_header: bool,
    #[serde(default)]
    width_mode: WidthMode,
    #[serde(default = "default_width_factor")]
    max_width_factor: f64,
    #[serde(default = "default_padding")]
    h_padding: String,
    #[serde(default)]
    style: TableStyle,
}

fn default_width_factor() -> f64 {
    1.0
}

fn default_padding() -> String {
    "0.5em".to_string()
}

impl TryFrom<RawTable> for Table {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        if raw.rows == 0 || raw.cols == 0 {
            return Err(Error::TableShape(format!(
                "{}x{} table, both dimensions must be at least 1",
                raw.rows, raw.cols
            )));
        }
        if raw.cells.len() != raw.rows {
            return Err(Error::TableShape(format!(
                "expected {} rows, found {}",
                raw.rows,
                raw.cells.len()
            )));
        }
        if raw.columns.len() != raw.cols {
            return Err(Error::TableShape(format!(
                "expected {} column specs, found {}",
                raw.cols,
                raw.columns.len()
            )));
        }
        if let Some(row) = raw.cells.iter().position(|cells| cells.len() != raw.cols) {
            return Err(Error::TableShape(format!(
                "row {} does not have {} columns",
                row, raw.cols
            )));
        }

        let mut cell_colors = vec![vec![None; raw.cols]; raw.rows];
        for CellColor { row, col, color } in raw.cell_colors {
            let Some(slot) = cell_colors.get_mut(row).and_then(|r| r.get_mut(col)) else {
                return Err(Error::TableShape(format!(
                    "color at ({}, {}) is outside the {}x{} grid",
                    row, col, raw.rows, raw.cols
                )));
            };
            *slot = Some(color);
        }

        Ok(Self {
            cells: raw.cells,
            cell_colors,
            columns: raw.columns,
            caption: raw.caption,
            label: raw.label,
            has_header: raw.has_header,
            width_mode: raw.width_mode,
            max_width_factor: raw.max_width_factor,
            h_padding: raw.h_padding,
            style: raw.style,
        })
    }
}

impl From<Table> for RawTable {
    fn from(table: Table) -> Self {
        let cell_colors = table
            .cell_colors
            .iter()
            .enumerate()
            .flat_map(|(row, colors)| {
                colors.iter().enumerate().filter_map(move |(col, color)| {
                    color.as_ref().map(|color| CellColor {
                        row,
                        col,
                        color: color.clone(),
                    })
                })
            })
            .collect();

        Self {
            rows: table.rows(),
            cols: table.cols(),
            cells: table.cells,
            cell_colors,
            columns: table.columns,
            caption: table.caption,
            label: table.label,
            has_header: table.has_header,
            width_mode: table.width_mode,
            max_width_factor: table.max_width_factor,
            h_padding: table.h_padding,
            style: table.style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_shape(table: &Table, rows: usize, cols: usize) {
        assert_eq!(table.rows(), rows);
        assert_eq!(table.cols(), cols);
        assert_eq!(table.cells.len(), rows);
        assert_eq!(table.cell_colors.len(), rows);
        assert!(table.cells.iter().all(|r| r.len() == cols));
        assert!(table.cell_colors.iter().all(|r| r.len() == cols));
        assert_eq!(table.columns.len(), cols);
    }

    #[test]
    fn new_table_defaults() {
        let table = Table::default();
        assert_shape(&table, 3, 3);
        assert!(table.has_header);
        assert_eq!(table.width_mode, WidthMode::Natural);
        assert_eq!(table.max_width_factor, 1.0);
        assert_eq!(table.h_padding, "0.5em");
        assert_eq!(table.style, TableStyle::Default);
        assert!(table.columns().iter().all(|c| c.align == Align::Center && c.width.is_none()));
        assert_eq!(table.cell(2, 2), Some(""));
        assert_eq!(table.cell_color(2, 2), None);
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        assert_shape(&Table::new(0, 0), 1, 1);
    }

    #[test]
    fn rows_and_columns_resize_together() {
        let mut table = Table::new(2, 2);
        table.add_row();
        assert_shape(&table, 3, 2);
        table.add_column();
        assert_shape(&table, 3, 3);
        assert!(table.remove_row());
        assert_shape(&table, 2, 3);
        assert!(table.remove_column());
        assert_shape(&table, 2, 2);
    }

    #[test]
    fn shrinking_stops_at_one() {
        let mut table = Table::new(1, 1);
        assert!(!table.remove_row());
        assert!(!table.remove_column());
        assert_shape(&table, 1, 1);
    }

    #[test]
    fn removing_a_column_keeps_other_cells() {
        let mut table = Table::new(1, 3);
        table.set_cell(0, 0, "a");
        table.set_cell(0, 1, "b");
        table.set_cell(0, 2, "c");
        table.remove_column();
        assert_eq!(table.cell(0, 0), Some("a"));
        assert_eq!(table.cell(0, 1), Some("b"));
        assert_eq!(table.cell(0, 2), None);
    }

    #[test]
    fn cell_color_out_of_bounds_is_ignored() {
        let mut table = Table::new(2, 2);
        assert!(!table.set_cell_color(2, 0, Some("red".into())));
        assert!(!table.set_cell_color(0, 5, Some("red".into())));
        assert!(table.set_cell_color(1, 1, Some("yellow!20".into())));
        assert_eq!(table.cell_color(1, 1), Some("yellow!20"));
        assert!(table.set_cell_color(1, 1, None));
        assert_eq!(table.cell_color(1, 1), None);
    }

    #[test]
    fn added_row_is_uncolored() {
        let mut table = Table::new(1, 2);
        table.set_cell_color(0, 0, Some("blue!10".into()));
        table.add_row();
        assert_eq!(table.cell_color(1, 0), None);
        assert_eq!(table.cell_color(0, 0), Some("blue!10"));
    }

    fn raw(rows: usize, cols: usize) -> RawTable {
        RawTable::from(Table::new(rows, cols))
    }

    #[test]
    fn colors_serialize_sparsely() {
        let mut table = Table::new(2, 3);
        table.set_cell_color(1, 2, Some("yellow!20".into()));
        assert_eq!(
            RawTable::from(table).cell_colors,
            vec![CellColor {
                row: 1,
                col: 2,
                color: "yellow!20".into()
            }]
        );
        assert!(raw(2, 2).cell_colors.is_empty());
    }

    #[test]
    fn color_outside_grid_is_rejected() {
        let mut outside = raw(2, 2);
        outside.cell_colors.push(CellColor {
            row: 0,
            col: 2,
            color: "red".into(),
        });
        assert!(matches!(Table::try_from(outside), Err(Error::TableShape(_))));
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let raw = RawTable {
            rows: 2,
            cols: 2,
            cells: vec![vec![String::new(); 2], vec![String::new(); 1]],
            cell_colors: Vec::new(),
            columns: vec![ColumnSpec::default(); 2],
            caption: String::new(),
            label: String::new(),
            has_header: false,
            width_mode: WidthMode::Natural,
            max_width_factor: 1.0,
            h_padding: default_padding(),
            style: TableStyle::Default,
        };
        let err = Table::try_from(raw).unwrap_err();
        assert!(matches!(err, Error::TableShape(_)));
    }

    #[test]
    fn raw_round_trip_preserves_grid() {
        let mut table = Table::new(2, 3);
        table.set_cell(1, 2, "x");
        table.set_cell_color(0, 1, Some("gray!30".into()));
        let back = Table::try_from(RawTable::from(table.clone())).unwrap();
        assert_eq!(back, table);
    }
}
