//! Spreadsheet import: cells in, positional field tuples out.
//!
//! The reconciler never sees a spreadsheet. It receives [`ImportRow`]s whose
//! five fields were already sliced out of the sheet according to a fixed
//! [`ColumnLayout`]. Each export variant has its own documented layout; the
//! layout is chosen up front, never sniffed from the header row.
//!
//! ## Layouts
//!
//! | Layout | First data row | id | nombre | puesto | gerencia | celular |
//! |---|---|---|---|---|---|---|
//! | `master` | 2 | A | B | C | D | E |
//! | `roster` | 3 | - | E | - | D | F |
//! | `managers` | 4 | - | C | `Gerente` | B | D |
//!
//! `roster` and `managers` exports interleave section titles with data, so a
//! row without a gerencia is outside their contract and is ignored here.
//!
//! Row numbers are the 1-based sheet rows an operator sees in the
//! spreadsheet application.

use calamine::{Data, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Source spreadsheet not found: {0}")]
    MissingSource(PathBuf),
    #[error("Cannot read spreadsheet {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("Spreadsheet has no worksheets: {0}")]
    NoWorksheet(PathBuf),
}

/// A single spreadsheet cell, reduced to what the reconciler cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    /// The sheet holds an error value (`#REF!`, `#N/A`, ...) here.
    Invalid(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Invalid(format!("{e:?}")),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// The five positional fields of one imported row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based sheet row number.
    pub number: usize,
    pub id: Cell,
    pub name: Cell,
    pub role: Cell,
    pub unit: Cell,
    pub phone: Cell,
}

/// Column contract of an export variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColumnLayout {
    /// Master sheet with an id column; the only layout that round-trips ids.
    #[default]
    Master,
    /// Legacy roster export: no ids, no role column.
    Roster,
    /// Managers sheet: no ids, every row is a manager.
    Managers,
}

/// Column positions (0-based) for one layout.
struct Columns {
    first_row: usize,
    id: Option<usize>,
    name: usize,
    role: Option<usize>,
    unit: usize,
    phone: usize,
    fixed_role: Option<&'static str>,
    requires_unit: bool,
}

impl ColumnLayout {
    fn columns(self) -> Columns {
        match self {
            ColumnLayout::Master => Columns {
                first_row: 2,
                id: Some(0),
                name: 1,
                role: Some(2),
                unit: 3,
                phone: 4,
                fixed_role: None,
                requires_unit: false,
            },
            ColumnLayout::Roster => Columns {
                first_row: 3,
                id: None,
                name: 4,
                role: None,
                unit: 3,
                phone: 5,
                fixed_role: None,
                requires_unit: true,
            },
            ColumnLayout::Managers => Columns {
                first_row: 4,
                id: None,
                name: 2,
                role: None,
                unit: 1,
                phone: 3,
                fixed_role: Some("Gerente"),
                requires_unit: true,
            },
        }
    }

    /// First sheet row holding data (1-based).
    pub fn first_data_row(self) -> usize {
        self.columns().first_row
    }

    /// Slice one sheet row into positional fields.
    ///
    /// Returns `None` when the row is outside this layout's contract (a row
    /// without gerencia in the `roster` and `managers` exports). Short rows
    /// read as empty cells.
    pub fn slice(self, number: usize, cells: &[Cell]) -> Option<ImportRow> {
        let cols = self.columns();
        let at = |i: usize| cells.get(i).cloned().unwrap_or(Cell::Empty);
        let unit = at(cols.unit);
        if cols.requires_unit && is_blank(&unit) {
            return None;
        }
        let role = match (cols.fixed_role, cols.role) {
            (Some(fixed), _) => Cell::text(fixed),
            (None, Some(i)) => at(i),
            (None, None) => Cell::Empty,
        };
        Some(ImportRow {
            number,
            id: cols.id.map(at).unwrap_or(Cell::Empty),
            name: at(cols.name),
            role,
            unit,
            phone: at(cols.phone),
        })
    }
}

fn is_blank(cell: &Cell) -> bool {
    match cell {
        Cell::Empty => true,
        Cell::Text(s) => s.trim().is_empty(),
        Cell::Invalid(_) => false,
    }
}

/// Rows handed to the reconciler, plus how many sheet rows the layout
/// ignored.
#[derive(Debug, Default)]
pub struct Sheet {
    pub rows: Vec<ImportRow>,
    pub ignored: usize,
}

/// Apply a layout to a grid of cells whose first entry is sheet row 1.
pub fn rows_from_grid(grid: &[Vec<Cell>], layout: ColumnLayout) -> Sheet {
    let first = layout.first_data_row();
    let mut sheet = Sheet::default();
    for (i, cells) in grid.iter().enumerate() {
        let number = i + 1;
        if number < first {
            continue;
        }
        match layout.slice(number, cells) {
            Some(row) => sheet.rows.push(row),
            None => sheet.ignored += 1,
        }
    }
    sheet
}

/// Read the first worksheet of a spreadsheet file and slice it by `layout`.
pub fn read_sheet(path: &Path, layout: ColumnLayout) -> Result<Sheet, ImportError> {
    if !path.exists() {
        return Err(ImportError::MissingSource(path.to_path_buf()));
    }
    let mut workbook = open_workbook_auto(path).map_err(|source| ImportError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::NoWorksheet(path.to_path_buf()))?
        .map_err(|source| ImportError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    // The range starts at the first used cell; pad so index 0 is row 1, column A.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(Cell::from));
        grid.push(cells);
    }

    let sheet = rows_from_grid(&grid, layout);
    tracing::debug!(
        path = %path.display(),
        ?layout,
        rows = sheet.rows.len(),
        ignored = sheet.ignored,
        "spreadsheet read"
    );
    Ok(sheet)
}
