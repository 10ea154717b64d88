use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::entry::GlossaryEntry;

/// First-letter selector value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterChoice {
    #[default]
    All,
    Letter(char),
}

impl LetterChoice {
    /// Read a selector value. Blank, `All` (any case) and anything longer
    /// than one character select everything; a single character is uppercased.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => LetterChoice::Letter(c.to_uppercase().next().unwrap_or(c)),
            _ => LetterChoice::All,
        }
    }

    pub fn matches(&self, entry: &GlossaryEntry) -> bool {
        match self {
            LetterChoice::All => true,
            LetterChoice::Letter(letter) => entry.initial() == Some(*letter),
        }
    }
}

impl fmt::Display for LetterChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LetterChoice::All => write!(f, "All"),
            LetterChoice::Letter(c) => write!(f, "{}", c),
        }
    }
}

/// Query-string form of the criteria: `?letter=B&q=cloud`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub letter: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// The current letter selection and free-text query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub letter: LetterChoice,
    pub query: String,
}

impl FilterCriteria {
    pub fn new(letter: LetterChoice, query: impl Into<String>) -> Self {
        FilterCriteria {
            letter,
            query: query.into(),
        }
    }

    /// Back to showing everything: letter `All`, empty query
    pub fn reset(&mut self) {
        *self = FilterCriteria::default();
    }

    pub fn is_default(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

impl From<FilterParams> for FilterCriteria {
    fn from(params: FilterParams) -> Self {
        FilterCriteria {
            letter: params
                .letter
                .as_deref()
                .map_or(LetterChoice::All, LetterChoice::parse),
            query: params.q.unwrap_or_default(),
        }
    }
}

// `needle` is already lower-cased
fn query_matches(needle: &str, entry: &GlossaryEntry) -> bool {
    needle.is_empty()
        || entry.term.to_lowercase().contains(needle)
        || entry.definition.to_lowercase().contains(needle)
}

/// Entries that pass the current filters, in working-set order
#[derive(Debug, Clone, Serialize)]
pub struct FilteredView<'a> {
    pub count: usize,
    pub entries: Vec<&'a GlossaryEntry>,
}

/// Run the filter pipeline over the working set.
///
/// # Examples
/// ```
/// use glossary::entry::GlossaryEntry;
/// use glossary::filter::{FilterCriteria, LetterChoice, apply};
///
/// let entries = vec![
///     GlossaryEntry::new("API Gateway", "Front door for services"),
///     GlossaryEntry::new("Bandwidth", "Data rate"),
/// ];
/// let view = apply(&entries, &FilterCriteria::new(LetterChoice::Letter('B'), ""));
/// assert_eq!(view.count, 1);
/// ```
pub fn apply<'a>(entries: &'a [GlossaryEntry], criteria: &FilterCriteria) -> FilteredView<'a> {
    let needle = criteria.query.to_lowercase();
    let entries: Vec<&GlossaryEntry> = entries
        .iter()
        .filter(|entry| criteria.letter.matches(entry) && query_matches(&needle, entry))
        .collect();

    FilteredView {
        count: entries.len(),
        entries,
    }
}

/// Distinct first letters across the whole working set, sorted
pub fn available_letters(entries: &[GlossaryEntry]) -> Vec<char> {
    entries
        .iter()
        .filter_map(GlossaryEntry::initial)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<GlossaryEntry> {
        vec![
            GlossaryEntry::new("API Gateway", "Routes requests to services"),
            GlossaryEntry::new("apple", "A fruit"),
            GlossaryEntry::new("Bandwidth", "Data rate of a link"),
            GlossaryEntry::new("bot", "Program calling an API on its own"),
            GlossaryEntry::new("Cloud", "Rented computing"),
        ]
    }

    fn terms<'a>(view: &FilteredView<'a>) -> Vec<&'a str> {
        view.entries.iter().copied().map(|e| e.term.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_keep_everything() {
        let entries = sample();
        let view = apply(&entries, &FilterCriteria::default());
        assert_eq!(view.count, entries.len());
        assert_eq!(terms(&view)[0], "API Gateway");
    }

    #[test]
    fn test_letter_matches_either_case() {
        let entries = sample();
        let view = apply(&entries, &FilterCriteria::new(LetterChoice::Letter('B'), ""));
        assert_eq!(terms(&view), vec!["Bandwidth", "bot"]);
    }

    #[test]
    fn test_query_searches_term_and_definition() {
        let entries = sample();
        let view = apply(&entries, &FilterCriteria::new(LetterChoice::All, "api"));
        assert_eq!(terms(&view), vec!["API Gateway", "bot"]);
    }

    #[test]
    fn test_letter_and_query_combine() {
        let entries = sample();
        let view = apply(&entries, &FilterCriteria::new(LetterChoice::Letter('B'), "API"));
        assert_eq!(terms(&view), vec!["bot"]);

        let none = apply(
            &entries,
            &FilterCriteria::new(LetterChoice::Letter('A'), "zzz-no-match"),
        );
        assert_eq!(none.count, 0);
        assert!(none.entries.is_empty());
    }

    #[test]
    fn test_reset_restores_full_view() {
        let entries = sample();
        let mut criteria = FilterCriteria::new(LetterChoice::Letter('C'), "rented");
        assert_eq!(apply(&entries, &criteria).count, 1);

        criteria.reset();
        assert!(criteria.is_default());
        assert_eq!(criteria.letter, LetterChoice::All);
        assert_eq!(criteria.query, "");
        assert_eq!(apply(&entries, &criteria).count, entries.len());
    }

    #[test]
    fn test_available_letters() {
        assert_eq!(available_letters(&sample()), vec!['A', 'B', 'C']);
    }

    #[test]
    fn test_letter_parse() {
        assert_eq!(LetterChoice::parse("b"), LetterChoice::Letter('B'));
        assert_eq!(LetterChoice::parse("All"), LetterChoice::All);
        assert_eq!(LetterChoice::parse("all"), LetterChoice::All);
        assert_eq!(LetterChoice::parse(""), LetterChoice::All);
        assert_eq!(LetterChoice::Letter('Q').to_string(), "Q");
    }

    #[test]
    fn test_criteria_from_params() {
        let criteria = FilterCriteria::from(FilterParams {
            letter: Some("c".to_string()),
            q: Some("cloud".to_string()),
        });
        assert_eq!(criteria, FilterCriteria::new(LetterChoice::Letter('C'), "cloud"));
        assert!(FilterCriteria::from(FilterParams::default()).is_default());
    }
}
