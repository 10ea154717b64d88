use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::error::{GlossaryError, Result};

/// A header row plus string rows, as read from a CSV export or a workbook.
///
/// Cells are kept as text; typing happens when entries are built.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        RawTable { headers, rows }
    }

    fn from_records(mut records: Vec<Vec<String>>) -> Result<Self> {
        if records.is_empty() {
            return Err(GlossaryError::Csv {
                line: 1,
                message: "no header row".to_string(),
            });
        }
        let headers = records.remove(0);
        Ok(RawTable::new(headers, records))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with exactly this header, if present
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name)
            .ok_or_else(|| GlossaryError::MissingColumn(name.to_string()))
    }
}

/// Cell text at `index`, reading cells past the end of a short row as empty.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Parse CSV text into a table
///
/// The first record is the header row. Quoted fields may contain commas,
/// newlines and doubled quotes; a quote inside an unquoted field is kept as
/// text. Blank lines are skipped and a leading byte-order mark is ignored.
///
/// # Arguments
/// * `text` - Whole CSV document, e.g. a Google Sheets export
///
/// # Returns
/// * `Result<RawTable>` - The parsed table or an error
///
/// # Errors
/// * `GlossaryError::Csv` if a quoted field is never closed or there is no header row
///
/// # Examples
/// ```
/// use glossary::sheet::parse_csv;
///
/// let table = parse_csv("Term,Definition\nAPI,\"Interface, public\"\n").unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.rows()[0][1], "Interface, public");
/// ```
pub fn parse_csv(text: &str) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            // Only a quote at the start of a field opens quoting; elsewhere it is literal
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' if !in_quotes => record.push(std::mem::take(&mut field)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
                line += 1;
            }
            _ => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }

    if in_quotes {
        return Err(GlossaryError::Csv {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    // Last record without a trailing newline
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    RawTable::from_records(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

/// Read the first worksheet of an XLSX, XLS or ODS workbook
///
/// Every cell is turned into text; whole numbers lose their `.0`.
///
/// # Arguments
/// * `path` - Path to the workbook
///
/// # Returns
/// * `Result<RawTable>` - The first row as headers and the rest as rows
///
/// # Examples
/// ```no_run
/// use glossary::sheet::read_workbook;
/// use std::path::Path;
///
/// match read_workbook(Path::new("data/glossary.xlsx")) {
///     Ok(table) => println!("Read {} rows", table.len()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
///
/// # Errors
/// * `GlossaryError::Spreadsheet` if the workbook can't be decoded or has no sheets
pub fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| GlossaryError::Spreadsheet("no sheets found in workbook".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());

    let headers = rows
        .next()
        .ok_or_else(|| GlossaryError::Spreadsheet(format!("sheet `{}` is empty", sheet_name)))?;

    Ok(RawTable::new(headers, rows.collect()))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Whole numbers print without a fractional part, so a term typed as `2030`
/// in a workbook reads back as "2030" rather than "2030.0".
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let table = parse_csv("Term,Definition\nAPI,Interface\nBot,Program\n").unwrap();
        assert_eq!(table.headers(), &["Term".to_string(), "Definition".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["Bot".to_string(), "Program".to_string()]);
    }

    #[test]
    fn test_quoted_fields_keep_commas_quotes_and_newlines() {
        let text = "Term,Definition\r\n\"Cloud, hybrid\",\"Mix of \"\"on-prem\"\"\nand public\"\r\n";
        let table = parse_csv(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(cell(&table.rows()[0], 0), "Cloud, hybrid");
        assert_eq!(cell(&table.rows()[0], 1), "Mix of \"on-prem\"\nand public");
    }

    #[test]
    fn test_blank_lines_and_bom_are_ignored() {
        let table = parse_csv("\u{feff}Term\n\nAPI\n\n").unwrap();
        assert_eq!(table.headers(), &["Term".to_string()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_last_record_without_newline() {
        let table = parse_csv("Term,Definition\nAPI,").unwrap();
        assert_eq!(table.rows()[0], vec!["API".to_string(), String::new()]);
    }

    #[test]
    fn test_unterminated_quote_reports_line() {
        match parse_csv("Term\nok\n\"broken\n") {
            Err(GlossaryError::Csv { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected CSV error, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let table = parse_csv("Term,Definition\n12\" rule,d\nBot,d\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(cell(&table.rows()[0], 0), "12\" rule");
        assert_eq!(cell(&table.rows()[1], 0), "Bot");
    }

    #[test]
    fn test_empty_quoted_field() {
        let table = parse_csv("Term,Definition\nAPI,\"\"\n").unwrap();
        assert_eq!(table.rows()[0], vec!["API".to_string(), String::new()]);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        assert!(matches!(parse_csv(""), Err(GlossaryError::Csv { .. })));
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let table = parse_csv("Term,Definition,Comment\nAPI\n").unwrap();
        let row = &table.rows()[0];
        assert_eq!(cell(row, 0), "API");
        assert_eq!(cell(row, 2), "");
    }

    #[test]
    fn test_column_lookup_trims_headers() {
        let table = RawTable::new(vec![" Term ".to_string(), "Comment".to_string()], vec![]);
        assert_eq!(table.column("Term"), Some(0));
        assert!(matches!(
            table.require_column("Definition"),
            Err(GlossaryError::MissingColumn(name)) if name == "Definition"
        ));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(2030.0), "2030");
        assert_eq!(format_number(0.5), "0.5");
    }
}
