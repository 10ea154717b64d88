use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::entry::{
    ABBREVIATION, CATEGORY, COMMENT, DEFINITION, GlossaryEntry, PUBLISH_FLAG, SOURCE_NAME,
    SOURCE_URL, TERM,
};
use crate::error::{GlossaryError, Result};
use crate::sheet::{RawTable, cell, parse_csv, read_workbook};

lazy_static! {
    static ref SHEET_ID_REGEX: Regex = Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").unwrap();
    static ref GID_REGEX: Regex = Regex::new(r"[#?&]gid=([0-9]+)").unwrap();
}

/// A published Google Sheet tab, fetched through its CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleSheet {
    pub sheet_id: String,
    pub gid: String,
}

impl GoogleSheet {
    pub fn new(sheet_id: impl Into<String>, gid: impl Into<String>) -> Self {
        GoogleSheet {
            sheet_id: sheet_id.into(),
            gid: gid.into(),
        }
    }

    /// Build from any sheet URL, e.g. the `/edit#gid=...` link a browser shows.
    /// A URL without a `gid` points at the first tab.
    ///
    /// # Examples
    /// ```
    /// use glossary::loader::GoogleSheet;
    ///
    /// let sheet = GoogleSheet::from_url(
    ///     "https://docs.google.com/spreadsheets/d/abc_123/edit#gid=42",
    /// ).unwrap();
    /// assert_eq!(sheet, GoogleSheet::new("abc_123", "42"));
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let sheet_id = SHEET_ID_REGEX
            .captures(url)
            .and_then(|c| c.get(1))
            .ok_or_else(|| GlossaryError::Config(format!("not a Google Sheets URL: {}", url)))?
            .as_str();

        let gid = GID_REGEX
            .captures(url)
            .and_then(|c| c.get(1))
            .map_or("0", |m| m.as_str());

        Ok(GoogleSheet::new(sheet_id, gid))
    }

    pub fn csv_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            self.sheet_id, self.gid
        )
    }
}

/// Where the glossary table comes from.
///
/// Both variants yield the same raw table; everything after the fetch is shared.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    GoogleSheet(GoogleSheet),
    LocalFile(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::GoogleSheet(sheet) => write!(f, "{}", sheet.csv_url()),
            DataSource::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

impl DataSource {
    /// Read the raw table from the source
    ///
    /// A Google Sheet is downloaded through its CSV export; a local file is
    /// read by extension (see [`read_local`]). No retries.
    ///
    /// # Returns
    /// * `Result<RawTable>` - The header row and string rows, or the first error hit
    ///
    /// # Examples
    /// ```no_run
    /// use glossary::loader::{DataSource, GoogleSheet};
    ///
    /// # async fn demo() -> glossary::error::Result<()> {
    /// let source = DataSource::GoogleSheet(GoogleSheet::new("12IsT3AZ1wrN1ECn3snwPf5M9oYP5geb1", "1289983907"));
    /// let table = source.fetch().await?;
    /// println!("Fetched {} rows", table.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self) -> Result<RawTable> {
        match self {
            DataSource::GoogleSheet(sheet) => parse_csv(&fetch_text(&sheet.csv_url()).await?),
            DataSource::LocalFile(path) => read_local(path),
        }
    }

    /// Fetch and prepare the working set
    ///
    /// # Returns
    /// * `Result<Vec<GlossaryEntry>>` - Published entries sorted by term, ignoring case
    ///
    /// # Errors
    /// * Anything [`DataSource::fetch`] or [`prepare`] reports
    ///
    /// # Examples
    /// ```no_run
    /// use glossary::loader::DataSource;
    ///
    /// # async fn demo() -> glossary::error::Result<()> {
    /// let entries = DataSource::LocalFile("data/glossary.xlsx".into()).load().await?;
    /// println!("Loaded {} glossary entries", entries.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self) -> Result<Vec<GlossaryEntry>> {
        let table = self.fetch().await?;
        let entries = prepare(&table)?;
        info!(
            "Loaded {} published glossary entries from {} ({} rows dropped)",
            entries.len(),
            self,
            table.len() - entries.len()
        );
        Ok(entries)
    }
}

#[cfg(feature = "web")]
lazy_static! {
    // One client for every sheet fetch
    static ref HTTP_CLIENT: reqwest::Client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default();
}

#[cfg(feature = "web")]
async fn fetch_text(url: &str) -> Result<String> {
    HTTP_CLIENT
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| GlossaryError::Fetch(e.to_string()))?
        .text()
        .await
        .map_err(|e| GlossaryError::Fetch(e.to_string()))
}

#[cfg(not(feature = "web"))]
async fn fetch_text(_url: &str) -> Result<String> {
    Err(GlossaryError::Fetch(
        "remote sheets require the 'web' feature".to_string(),
    ))
}

/// Read a local glossary file
///
/// This function examines the file extension and calls the matching reader:
/// `.csv` is parsed as CSV, while `.xlsx`, `.xlsm`, `.xls` and `.ods` are read
/// from their first worksheet.
///
/// # Arguments
/// * `path` - Path to the glossary file
///
/// # Returns
/// * `Result<RawTable>` - The loaded table or an error
///
/// # Errors
/// * `GlossaryError::UnsupportedFile` for other or missing extensions
/// * `GlossaryError::Io` if a CSV file can't be read
///
/// # Examples
/// ```no_run
/// use glossary::loader::read_local;
/// use std::path::Path;
///
/// match read_local(Path::new("data/glossary.csv")) {
///     Ok(table) => println!("Read {} rows", table.len()),
///     Err(e) => eprintln!("Error loading glossary: {}", e),
/// }
/// ```
pub fn read_local(path: &Path) -> Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => parse_csv(&std::fs::read_to_string(path)?),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => read_workbook(path),
        Some(ext) => Err(GlossaryError::UnsupportedFile(format!(
            "unsupported file extension: {}",
            ext
        ))),
        None => Err(GlossaryError::UnsupportedFile(format!(
            "{} has no extension",
            path.display()
        ))),
    }
}

/// Check a `Publish_bnry` cell
///
/// A row is published when the flag reads as the number 1 (`1`, `1.0`) or as
/// boolean true (`TRUE`, `true`), which is how checkbox columns export.
///
/// # Arguments
/// * `flag` - Raw cell text
///
/// # Returns
/// * `bool` - Whether the row belongs in the working set
pub fn is_published(flag: &str) -> bool {
    let flag = flag.trim();
    flag.eq_ignore_ascii_case("true") || flag.parse::<f64>().is_ok_and(|v| v == 1.0)
}

/// Turn a raw table into the working set.
///
/// Keeps published rows only, drops the comment column, and sorts by term
/// ignoring case. Rows with equal keys keep their sheet order.
///
/// # Arguments
/// * `table` - Raw table from any source; extra columns are ignored
///
/// # Returns
/// * `Result<Vec<GlossaryEntry>>` - The working set
///
/// # Errors
/// * `GlossaryError::MissingColumn` naming the first required column not found
pub fn prepare(table: &RawTable) -> Result<Vec<GlossaryEntry>> {
    let term = table.require_column(TERM)?;
    let definition = table.require_column(DEFINITION)?;
    let category = table.require_column(CATEGORY)?;
    let publish = table.require_column(PUBLISH_FLAG)?;
    table.require_column(COMMENT)?;

    let abbreviation = table.column(ABBREVIATION);
    let source_name = table.column(SOURCE_NAME);
    let source_url = table.column(SOURCE_URL);

    let mut entries: Vec<GlossaryEntry> = table
        .rows()
        .iter()
        .filter(|row| is_published(cell(row, publish)))
        .map(|row| GlossaryEntry {
            term: cell(row, term).trim().to_string(),
            definition: cell(row, definition).trim().to_string(),
            category: cell(row, category).trim().to_string(),
            abbreviation: optional(row, abbreviation),
            source_name: optional(row, source_name),
            source_url: optional(row, source_url),
        })
        .collect();

    entries.sort_by_cached_key(|entry| entry.term.to_lowercase());
    Ok(entries)
}

fn optional(row: &[String], index: Option<usize>) -> Option<String> {
    let value = cell(row, index?).trim();
    (!value.is_empty()).then(|| value.to_string())
}
