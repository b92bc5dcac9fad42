//! Minimal in-memory CSV table: a header row plus string records.

use crate::error::BinderError;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

/// A parsed CSV document.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Parse CSV text whose first row is the header.
    ///
    /// A leading UTF-8 BOM is ignored and ragged rows are accepted; cells
    /// past the end of a short row read as empty.
    pub fn parse(text: &str) -> Result<Self, BinderError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| BinderError::CsvParse {
                detail: e.to_string(),
            })?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BinderError::CsvParse {
                detail: e.to_string(),
            })?;

        debug!("Parsed CSV: {} columns, {} rows", headers.len(), rows.len());
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell `index` of `row`, or `""` when the row is short or the column absent.
pub fn cell(row: &StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_rows() {
        let t = CsvTable::parse("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(t.headers(), &["a".to_string(), "b".to_string()]);
        assert_eq!(t.len(), 2);
        assert_eq!(cell(&t.rows()[1], Some(0)), "3");
    }

    #[test]
    fn strips_bom_and_tolerates_ragged_rows() {
        let t = CsvTable::parse("\u{feff}name,price\nPikachu\n").unwrap();
        assert_eq!(t.headers()[0], "name");
        assert_eq!(cell(&t.rows()[0], Some(1)), "");
        assert_eq!(cell(&t.rows()[0], None), "");
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let t = CsvTable::parse("name,price\n\"Team Rocket's Mewtwo ex, Full Art\",\"$1,000.00\"\n")
            .unwrap();
        assert_eq!(cell(&t.rows()[0], Some(0)), "Team Rocket's Mewtwo ex, Full Art");
        assert_eq!(cell(&t.rows()[0], Some(1)), "$1,000.00");
    }

    #[test]
    fn header_only_is_empty() {
        let t = CsvTable::parse("name,price\n").unwrap();
        assert!(t.is_empty());
    }
}
