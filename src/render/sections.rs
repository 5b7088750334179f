use std::sync::LazyLock;

use regex::Regex;

/// Section titles the generation prompt asks for, in order.
pub const EXPECTED_SECTIONS: [&str; 9] = [
    "Competitor Overview",
    "Products",
    "Market Trends",
    "Pricing",
    "Strengths",
    "Weaknesses",
    "Market Positioning",
    "Additional Insights",
    "Conclusion",
];

/// The Products section is cut to this many bullet items when rendered.
pub const MAX_PRODUCTS: usize = 5;

static BOLD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<b>(.*?)</b>").expect("valid bold tag regex"));

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[.)]\s*").expect("valid ordinal regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn is_products(&self) -> bool {
        normalize_title(&self.title) == "products"
    }
}

/// Splits battlecard text into bold-titled sections.
///
/// A section starts at a blank line followed by `**`; the title runs up to
/// the next `**`. Chunks without a closing marker (such as a preamble
/// before the first heading) are dropped. The Products section keeps only
/// its first [`MAX_PRODUCTS`] bullets.
pub fn parse_sections(text: &str) -> Vec<Section> {
    let text = text.replace("\r\n", "\n");
    let text = text.trim_start();
    let text = text.strip_prefix("**").unwrap_or(text);

    text.split("\n\n**")
        .filter_map(|chunk| {
            let (title, body) = chunk.split_once("**")?;
            let mut section = Section {
                title: title.trim().to_string(),
                body: body.trim_start_matches(':').trim().to_string(),
            };
            if section.is_products() {
                section.body = top_products(&section.body, MAX_PRODUCTS);
            }
            Some(section)
        })
        .collect()
}

/// Lowercased title with any leading ordinal and trailing colon removed,
/// so `**2. Products:**` matches `Products`.
pub fn normalize_title(title: &str) -> String {
    let title = title.trim();
    let title = ORDINAL.replace(title, "");
    title
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

/// Expected titles that do not appear among the parsed sections.
pub fn missing_sections(sections: &[Section]) -> Vec<&'static str> {
    EXPECTED_SECTIONS
        .iter()
        .copied()
        .filter(|expected| {
            let expected = expected.to_lowercase();
            !sections
                .iter()
                .any(|s| normalize_title(&s.title) == expected)
        })
        .collect()
}

/// Replaces `<b>text</b>` with `text`.
pub fn strip_bold_tags(text: &str) -> String {
    BOLD_TAG.replace_all(text, "$1").into_owned()
}

fn bullet_text(line: &str) -> Option<&str> {
    let line = line.trim_start();
    ["* ", "- ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .or_else(|| (line == "*" || line == "-").then_some(""))
}

/// Keeps any intro lines plus the first `limit` bullet items, each
/// re-emitted as `* item`. Bodies without bullets are left alone.
fn top_products(body: &str, limit: usize) -> String {
    let mut intro: Vec<&str> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for line in body.lines() {
        match bullet_text(line) {
            Some(text) => items.push(text.replace("**", "").trim().to_string()),
            None if items.is_empty() => intro.push(line.trim_end()),
            None => {
                // Continuation of the previous item.
                if let Some(last) = items.last_mut()
                    && !line.trim().is_empty()
                {
                    last.push(' ');
                    last.push_str(line.trim());
                }
            }
        }
    }

    if items.is_empty() {
        return body.to_string();
    }

    intro
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .chain(
            items
                .into_iter()
                .filter(|item| !item.is_empty())
                .take(limit)
                .map(|item| format!("* {item}")),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = "Here is the battlecard for Vivo:\n\n\
        **Competitor Overview**\nVivo is a smartphone maker.\n\n\
        **Products**\n* X100 Pro\n* V30\n* Y200\n* T3\n* iQOO 12\n* Vivo Watch 3\n* TWS 3\n\n\
        **Market Trends**\nFoldables are growing.\n\n\
        **Strengths**\n* Camera partnerships with Zeiss";

    #[test]
    fn test_sections_in_order_without_preamble() {
        let sections = parse_sections(CARD);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Competitor Overview", "Products", "Market Trends", "Strengths"]
        );
        assert_eq!(sections[0].body, "Vivo is a smartphone maker.");
    }

    #[test]
    fn test_products_truncated_to_five() {
        let sections = parse_sections(CARD);
        assert_eq!(
            sections[1].body,
            "* X100 Pro\n* V30\n* Y200\n* T3\n* iQOO 12"
        );
    }

    #[test]
    fn test_products_keep_intro_and_strip_bold() {
        let text = "**Products:**\nCurrent lineup:\n* **Galaxy S24**: flagship\n- Galaxy A55\n  mid-range";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].body,
            "Current lineup:\n* Galaxy S24: flagship\n* Galaxy A55 mid-range"
        );
    }

    #[test]
    fn test_products_without_bullets_untouched() {
        let sections = parse_sections("**Products**\nNo products announced.");
        assert_eq!(sections[0].body, "No products announced.");
    }

    #[test]
    fn test_leading_marker_and_numbered_titles() {
        let text = "**1. Competitor Overview**\nOverview.\n\n**2. Products**\n* A\n* B\n* C\n* D\n* E\n* F";
        let sections = parse_sections(text);
        assert_eq!(sections[0].title, "1. Competitor Overview");
        assert!(sections[1].is_products());
        assert_eq!(sections[1].body.lines().count(), 5);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title(" 3) Market Trends: "), "market trends");
        assert_eq!(normalize_title("Additional Insights"), "additional insights");
    }

    #[test]
    fn test_missing_sections_reported() {
        let missing = missing_sections(&parse_sections(CARD));
        assert_eq!(
            missing,
            vec![
                "Pricing",
                "Weaknesses",
                "Market Positioning",
                "Additional Insights",
                "Conclusion"
            ]
        );
    }

    #[test]
    fn test_text_without_sections() {
        assert!(parse_sections("Plain answer with no headings.").is_empty());
        assert!(parse_sections("").is_empty());
    }

    #[test]
    fn test_strip_bold_tags() {
        assert_eq!(
            strip_bold_tags("Use <b>camera</b> and <B>price</B>"),
            "Use camera and price"
        );
    }
}
