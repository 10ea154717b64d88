use thiserror::Error;

/// Everything that can go wrong while loading the glossary.
///
/// An empty filter result is not an error; it renders a zero count.
#[derive(Debug, Error)]
pub enum GlossaryError {
    /// The remote sheet could not be fetched or answered with a non-success status
    #[error("failed to fetch glossary sheet: {0}")]
    Fetch(String),

    #[error("failed to read glossary file: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be decoded or has no worksheet
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("malformed CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("unsupported glossary file: {0}")]
    UnsupportedFile(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to render page: {0}")]
    Render(String),
}

impl From<calamine::Error> for GlossaryError {
    fn from(e: calamine::Error) -> Self {
        GlossaryError::Spreadsheet(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlossaryError>;
