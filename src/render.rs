use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;

use crate::entry::GlossaryEntry;
use crate::error::{GlossaryError, Result};
use crate::filter::{FilterCriteria, FilteredView, LetterChoice};

const PAGE_TEMPLATE: &str = "glossary";

#[derive(Serialize)]
struct LetterOption {
    value: String,
    selected: bool,
}

#[derive(Serialize)]
struct IndexLink {
    letter: char,
    href: String,
    active: bool,
}

#[derive(Serialize)]
struct SourceLink<'a> {
    label: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct EntryView<'a> {
    term: &'a str,
    abbreviation: Option<&'a str>,
    definition: &'a str,
    category: &'a str,
    source: Option<SourceLink<'a>>,
}

impl<'a> From<&'a GlossaryEntry> for EntryView<'a> {
    fn from(entry: &'a GlossaryEntry) -> Self {
        EntryView {
            term: &entry.term,
            abbreviation: entry.abbreviation.as_deref(),
            definition: &entry.definition,
            category: &entry.category,
            source: entry.source_url.as_deref().map(|url| SourceLink {
                label: entry.source_label().unwrap_or(url),
                url,
            }),
        }
    }
}

#[derive(Serialize)]
struct PageData<'a> {
    letters: Vec<LetterOption>,
    index: Vec<IndexLink>,
    query: &'a str,
    count: String,
    entries: Vec<EntryView<'a>>,
    fetched_at: String,
}

/// Renders the glossary page from a filtered view
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(PAGE_TEMPLATE, include_str!("./templates/glossary.hbs"))
            .map_err(|e| GlossaryError::Render(e.to_string()))?;
        Ok(PageRenderer { registry })
    }

    /// Render the full page.
    ///
    /// `letters` are the selector choices for the whole working set, not just
    /// the filtered view, so narrowing a search never hides a letter.
    pub fn render_page(
        &self,
        criteria: &FilterCriteria,
        letters: &[char],
        view: &FilteredView<'_>,
        fetched_at: DateTime<Utc>,
    ) -> Result<String> {
        let data = PageData {
            letters: letter_options(criteria.letter, letters),
            index: index_links(criteria, letters),
            query: &criteria.query,
            count: format_count(view.count),
            entries: view.entries.iter().map(|entry| EntryView::from(*entry)).collect(),
            fetched_at: fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        };

        self.registry
            .render(PAGE_TEMPLATE, &data)
            .map_err(|e| GlossaryError::Render(e.to_string()))
    }
}

fn letter_options(selected: LetterChoice, letters: &[char]) -> Vec<LetterOption> {
    std::iter::once(LetterChoice::All)
        .chain(letters.iter().map(|&c| LetterChoice::Letter(c)))
        .map(|choice| LetterOption {
            value: choice.to_string(),
            selected: choice == selected,
        })
        .collect()
}

// A-Z bar: jump to a letter, keeping the current search text
fn index_links(criteria: &FilterCriteria, letters: &[char]) -> Vec<IndexLink> {
    letters
        .iter()
        .map(|&letter| IndexLink {
            letter,
            href: letter_href(letter, &criteria.query),
            active: criteria.letter == LetterChoice::Letter(letter),
        })
        .collect()
}

pub fn letter_href(letter: char, query: &str) -> String {
    let letter = urlencoding::encode(&letter.to_string()).into_owned();
    if query.is_empty() {
        format!("/?letter={}", letter)
    } else {
        format!("/?letter={}&q={}", letter, urlencoding::encode(query))
    }
}

/// Group digits in thousands: `12345` becomes `"12,345"`
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::apply;

    fn entries() -> Vec<GlossaryEntry> {
        let mut api = GlossaryEntry::new("API", "Application <programming> interface");
        api.abbreviation = Some("API".to_string());
        api.category = "Software".to_string();
        api.source_url = Some("https://example.org/api".to_string());
        api.source_name = Some("Example".to_string());

        let mut bot = GlossaryEntry::new("Bot", "Automated program");
        bot.source_url = Some("https://example.org/bot".to_string());

        vec![api, bot]
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_letter_href_encodes_query() {
        assert_eq!(letter_href('B', ""), "/?letter=B");
        assert_eq!(letter_href('B', "big data"), "/?letter=B&q=big%20data");
    }

    #[test]
    fn test_render_page_lists_entries() {
        let entries = entries();
        let criteria = FilterCriteria::default();
        let view = apply(&entries, &criteria);
        let html = PageRenderer::new()
            .unwrap()
            .render_page(&criteria, &['A', 'B'], &view, Utc::now())
            .unwrap();

        assert!(html.contains("<strong>2</strong> terms found."));
        assert!(html.contains("<h3>API</h3>"));
        assert!(html.contains("<strong>Abbreviation:</strong> API"));
        assert!(html.contains("<strong>Category:</strong> Software"));
        assert!(html.contains(">Example</a>"));
        // Source without a name falls back to its URL as link text
        assert!(html.contains(">https://example.org/bot</a>"));
        // Template output is escaped
        assert!(html.contains("&lt;programming&gt;"));
        assert!(html.contains("<option value=\"All\" selected>"));
    }

    #[test]
    fn test_render_page_marks_selected_letter() {
        let entries = entries();
        let criteria = FilterCriteria::new(LetterChoice::Letter('B'), "");
        let view = apply(&entries, &criteria);
        let html = PageRenderer::new()
            .unwrap()
            .render_page(&criteria, &['A', 'B'], &view, Utc::now())
            .unwrap();

        assert!(html.contains("<strong>1</strong> terms found."));
        assert!(html.contains("<option value=\"B\" selected>"));
        assert!(!html.contains("<h3>API</h3>"));
    }
}
