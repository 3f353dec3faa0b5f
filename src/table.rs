use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::{Error, Result};

/// One cell of a table. `None` is a missing value (an empty field in the
/// source file).
pub type Cell = Option<String>;

/// A table of named columns, as produced by the file loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Rows shorter than the header are padded with missing cells, longer
    /// rows are truncated.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Load a table from disk. The format follows the extension: `.csv` is
    /// comma separated, `.tsv` and `.txt` are tab separated, and workbooks
    /// (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read from their first
    /// sheet with the first row as headers.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let table = match extension.as_str() {
            "csv" => Self::from_delimited(path, b',')?,
            "tsv" | "txt" => Self::from_delimited(path, b'\t')?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_workbook(path)?,
            _ => {
                return Err(Error::UnsupportedFormat(format!(
                    "{} (expected a spreadsheet or a .csv, .tsv or .txt file)",
                    path.display()
                )))
            }
        };
        debug!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );
        Ok(table)
    }

    fn from_delimited(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            None
                        } else {
                            Some(field.to_string())
                        }
                    })
                    .collect(),
            );
        }
        Ok(Self::new(headers, rows))
    }

    fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            Error::UnsupportedFormat(format!("{} (workbook has no sheets)", path.display()))
        })??;
        Ok(Self::from_range(&range))
    }

    /// First row of the sheet becomes the headers.
    fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| {
                row.iter()
                    .map(|cell| sheet_cell(cell).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(sheet_cell).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its exact header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }

    /// Keep only the rows the predicate accepts.
    pub fn retain_rows<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let rows = self.rows.into_iter().filter(|row| keep(row.as_slice())).collect();
        Self {
            headers: self.headers,
            rows,
        }
    }
}

/// Whole-number floats print without a fraction, so numeric ids read from
/// a workbook match the same ids written as text.
fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".into())]],
        );
        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None]);
    }

    #[test]
    fn test_load_csv_with_missing_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staff.csv");
        fs::write(&path, "Associate ID,Reports To Manager ID\n1,\n2,1\n").unwrap();

        let table = Table::from_path(&path).unwrap();
        assert_eq!(table.headers(), &["Associate ID", "Reports To Manager ID"]);
        assert_eq!(table.len(), 2);
        let managers: Vec<Option<&str>> = table.column_values(1).collect();
        assert_eq!(managers, vec![None, Some("1")]);
    }

    #[test]
    fn test_load_tsv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staff.tsv");
        fs::write(&path, "id\tmanager\n7\t3\n").unwrap();

        let table = Table::from_path(&path).unwrap();
        assert_eq!(table.column_index("manager"), Some(1));
        assert_eq!(table.rows()[0][0].as_deref(), Some("7"));
    }

    #[test]
    fn test_sheet_range_becomes_table() {
        let mut range = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Associate ID".into()));
        range.set_value((0, 1), Data::String("Reports To Manager ID".into()));
        range.set_value((1, 0), Data::Float(1.0));
        range.set_value((2, 0), Data::Int(2));
        range.set_value((2, 1), Data::Float(1.0));

        let table = Table::from_range(&range);
        assert_eq!(table.headers(), &["Associate ID", "Reports To Manager ID"]);
        assert_eq!(
            table.rows(),
            &[
                vec![Some("1".to_string()), None],
                vec![Some("2".to_string()), Some("1".to_string())],
            ]
        );
    }

    #[test]
    fn test_corrupt_workbook_is_spreadsheet_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("staff.xlsx");
        fs::write(&path, [0x50u8, 0x4b, 0x03, 0x04]).unwrap();

        let err = Table::from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Spreadsheet(_)), "got: {:?}", err);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = Table::from_path(Path::new("/data/staff.json")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
