use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use log::debug;

use crate::error::{ReportError, Result};
use crate::sheet::{Cell, RawSheet};

/// Reads the first worksheet of an `.xlsx` file into a [`RawSheet`] named
/// after the file.
///
/// The grid is re-anchored at A1: workbooks whose used range starts below
/// or right of the first cell get padded with empty rows and cells so row
/// and column indices always mean what they mean on screen.
pub fn read_report(path: &Path) -> Result<RawSheet> {
    let spreadsheet_error = |message: String| ReportError::Spreadsheet {
        path: path.display().to_string(),
        message,
    };

    // The annotation on `e` is load-bearing while the workbook is still `Xlsx<_>`.
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: XlsxError| spreadsheet_error(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| spreadsheet_error("workbook contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_from_data));
        rows.push(cells);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(RawSheet::new(name, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

/// Lists the `.xlsx` files directly inside `dir`, sorted by name so runs
/// are deterministic regardless of directory order.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_xlsx = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        if path.is_file() && is_xlsx {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
