use serde::{Deserialize, Serialize};

pub const TERM: &str = "Term";
pub const DEFINITION: &str = "Definition";
pub const CATEGORY: &str = "Category_1";
pub const PUBLISH_FLAG: &str = "Publish_bnry";
pub const COMMENT: &str = "Comment";
pub const ABBREVIATION: &str = "Abbreviation";
pub const SOURCE_NAME: &str = "Source_name";
pub const SOURCE_URL: &str = "Source_url";

/// One published glossary term.
///
/// The publish flag and the internal comment are consumed at load time and
/// never reach an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
    pub category: String,
    pub abbreviation: Option<String>,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
}

impl GlossaryEntry {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        GlossaryEntry {
            term: term.into(),
            definition: definition.into(),
            category: String::new(),
            abbreviation: None,
            source_name: None,
            source_url: None,
        }
    }

    /// Upper-cased first character of the term, used by the letter filter
    pub fn initial(&self) -> Option<char> {
        self.term
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }

    /// Text for the source link: the source name, falling back to the URL
    pub fn source_label(&self) -> Option<&str> {
        let url = self.source_url.as_deref()?;
        Some(self.source_name.as_deref().unwrap_or(url))
    }
}
