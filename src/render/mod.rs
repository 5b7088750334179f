//! Battlecard documents: section parsing, templates and PDF output.

pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod sections;
pub mod template;

pub use sections::{EXPECTED_SECTIONS, MAX_PRODUCTS, Section, missing_sections, parse_sections};
pub use template::{DEFAULT_TEMPLATE, TEMPLATES, Template};

use crate::error::AppResult;

/// Renders one competitor's battlecard text as PDF bytes.
///
/// Missing sections are logged and skipped; the rest render in the order
/// they appear in the text.
pub fn render_battlecard(competitor: &str, text: &str, template: &Template) -> AppResult<Vec<u8>> {
    let sections = parse_sections(text);
    let missing = missing_sections(&sections);
    if !missing.is_empty() {
        tracing::warn!(
            competitor,
            missing = ?missing,
            found = sections.len(),
            "Battlecard is missing expected sections"
        );
    }

    let pages = layout::layout(competitor, &sections, template);
    tracing::debug!(competitor, pages = pages.len(), template = template.name, "Laid out battlecard");
    pdf::write_pdf(&pages)
}
