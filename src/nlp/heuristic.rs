//! Rule-based recognizer for news headlines and ledes.
//!
//! Candidate spans are runs of adjacent capitalized tokens (plus model
//! numbers trailing a name, e.g. `Galaxy S24`). A span is a `PRODUCT` when
//! it carries a model marker or a known product word, an `ORG` when it ends
//! in a corporate suffix, is a known organization or is a short acronym.
//! Everything else is `MISC`.

use std::sync::LazyLock;

use regex::Regex;

use super::{Entity, EntityLabel, EntityRecognizer};
use crate::error::AppResult;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}&'’.\-]*").expect("token pattern is valid")
});

static PERIOD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Q[1-4]|H[12]|FY\d{2,4}|\d{4}s?|\d{1,2}(?:st|nd|rd|th))$")
        .expect("period pattern is valid")
});

const LEADING_STOPWORDS: &[&str] = &[
    "A", "An", "And", "As", "At", "But", "By", "For", "From", "He", "How", "If", "In", "Is", "It",
    "Its", "New", "Of", "On", "Or", "Our", "She", "So", "That", "The", "These", "They", "This",
    "To", "We", "What", "When", "Where", "Which", "While", "Who", "Why", "With", "You",
];

const CALENDAR_WORDS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december",
];

const TITLE_WORDS: &[&str] = &[
    "ceo", "cfo", "cto", "coo", "chairman", "chairwoman", "president", "founder", "director",
    "analyst", "executive", "spokesperson", "chief",
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "limited", "llc", "plc", "co", "company", "group",
    "holdings", "technologies", "technology", "tech", "labs", "systems", "electronics",
    "motors", "networks", "software", "semiconductor", "semiconductors", "communications",
    "ag", "gmbh", "sa", "nv", "bank", "partners", "ventures", "capital", "research",
    "university", "institute", "association", "agency",
];

const KNOWN_ORGS: &[&str] = &[
    "apple", "samsung", "google", "alphabet", "microsoft", "amazon", "meta", "facebook",
    "vivo", "oppo", "xiaomi", "huawei", "oneplus", "realme", "honor", "motorola", "nokia",
    "sony", "lg", "lenovo", "asus", "acer", "dell", "hp", "intel", "amd", "nvidia", "qualcomm",
    "mediatek", "tsmc", "ibm", "oracle", "salesforce", "adobe", "tesla", "netflix", "openai",
    "anthropic", "alibaba", "tencent", "baidu", "bytedance", "spotify", "uber", "zte",
    "ericsson", "cisco", "verizon", "at&t", "t-mobile", "vodafone", "reuters", "bloomberg",
    "counterpoint", "idc", "gartner", "canalys", "deepmind", "nasdaq",
];

const PRODUCT_WORDS: &[&str] = &[
    "iphone", "ipad", "imac", "macbook", "airpods", "galaxy", "pixel", "chatgpt", "copilot",
    "gemini", "windows", "android", "ios", "macos", "playstation", "xbox", "kindle", "alexa",
    "echo", "surface", "chromebook", "snapdragon", "exynos", "geforce", "ryzen", "claude",
    "llama", "bixby", "siri", "vision",
];

/// Trailing variant words that mark a product line when they follow a name.
const VARIANT_WORDS: &[&str] = &[
    "pro", "max", "ultra", "plus", "mini", "lite", "fold", "flip", "buds", "watch", "tab", "fe",
];

const NON_ORG_ACRONYMS: &[&str] = &[
    "AI", "AR", "VR", "US", "USA", "UK", "EU", "UN", "CEO", "CFO", "CTO", "COO", "TV", "PC",
    "IPO", "GDP", "API", "USD", "EUR", "GB", "TB", "OS", "UI", "UX", "LLM", "GPU", "CPU", "5G",
    "4G", "FAQ", "PR", "Q&A",
];

#[derive(Debug, Clone)]
struct Token<'a> {
    text: &'a str,
    /// Text between the previous token and this one.
    gap: &'a str,
    ends_sentence: bool,
    possessive: bool,
}

/// Deterministic recognizer that needs no model download.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let mut entities = Vec::new();
        let mut span: Vec<&Token<'_>> = Vec::new();

        for token in &tokens {
            let joins = !span.is_empty()
                && span
                    .last()
                    .is_some_and(|prev| !prev.ends_sentence && !prev.possessive)
                && token.gap.chars().all(char::is_whitespace)
                && !is_title_word(token.text)
                && is_name_like(token.text, false);

            if joins {
                span.push(token);
                continue;
            }

            flush(&mut span, &mut entities);

            if is_name_like(token.text, true) && !is_title_word(token.text) {
                span.push(token);
            }
        }
        flush(&mut span, &mut entities);

        entities
    }
}

#[async_trait::async_trait]
impl EntityRecognizer for HeuristicRecognizer {
    async fn recognize(&self, text: &str) -> AppResult<Vec<Entity>> {
        Ok(self.extract(text))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for m in TOKEN.find_iter(text) {
        let raw = m.as_str();
        let mut word = raw.trim_end_matches(['.', '-', '\'', '’']);
        let mut possessive = false;
        for suffix in ["'s", "’s"] {
            if let Some(stripped) = word.strip_suffix(suffix) {
                word = stripped;
                possessive = true;
            }
        }

        let abbreviation = ORG_SUFFIXES.contains(&word.to_lowercase().as_str());
        let after = &text[m.end()..];
        let ends_sentence = (raw.ends_with('.') && !abbreviation)
            || after
                .trim_start_matches([' ', '"', '\'', ')', '’', '”'])
                .starts_with(['.', '!', '?']);

        tokens.push(Token {
            text: word,
            gap: &text[last_end..m.start()],
            ends_sentence,
            possessive,
        });
        last_end = m.end();
    }

    tokens
}

fn is_name_like(word: &str, first_in_span: bool) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };
    if first.is_uppercase() {
        return true;
    }
    if first.is_lowercase() && word.chars().skip(1).any(char::is_uppercase) {
        return true;
    }
    !first_in_span && first.is_ascii_digit() && !PERIOD_MARKER.is_match(word)
}

fn is_title_word(word: &str) -> bool {
    TITLE_WORDS.contains(&word.to_lowercase().as_str())
}

fn has_model_marker(word: &str) -> bool {
    if PERIOD_MARKER.is_match(word) || NON_ORG_ACRONYMS.contains(&word) {
        return false;
    }
    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let has_alpha = word.chars().any(char::is_alphabetic);
    let camel = word.chars().next().is_some_and(char::is_lowercase)
        && word.chars().any(char::is_uppercase);
    (has_digit && has_alpha) || camel
}

fn is_acronym(word: &str) -> bool {
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();
    (2..=5).contains(&letters)
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '&' || c == '-')
        && !NON_ORG_ACRONYMS.contains(&word)
}

fn flush(span: &mut Vec<&Token<'_>>, entities: &mut Vec<Entity>) {
    let words: Vec<&str> = span.iter().map(|t| t.text).collect();
    span.clear();

    let mut words = words.as_slice();
    while let Some((first, rest)) = words.split_first() {
        if LEADING_STOPWORDS.contains(first) {
            words = rest;
        } else {
            break;
        }
    }
    if words.is_empty()
        || words
            .iter()
            .all(|w| CALENDAR_WORDS.contains(&w.to_lowercase().as_str()) || PERIOD_MARKER.is_match(w))
    {
        return;
    }

    let label = classify(words);
    entities.push(Entity::new(words.join(" "), label));
}

fn classify(words: &[&str]) -> EntityLabel {
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let joined = lower.join(" ");

    let numbered = words
        .iter()
        .enumerate()
        .any(|(i, w)| has_model_marker(w) || (i > 0 && w.chars().all(|c| c.is_ascii_digit())));
    let product_word = lower.iter().any(|w| PRODUCT_WORDS.contains(&w.as_str()));
    let variant = words.len() > 1
        && lower
            .iter()
            .skip(1)
            .any(|w| VARIANT_WORDS.contains(&w.as_str()));

    if numbered || product_word || variant {
        return EntityLabel::Product;
    }

    let suffixed = words.len() > 1
        && lower
            .last()
            .is_some_and(|w| ORG_SUFFIXES.contains(&w.as_str()));
    let known = KNOWN_ORGS.contains(&joined.as_str())
        || (words.len() > 1 && KNOWN_ORGS.contains(&lower[0].as_str()) && suffixed);

    if suffixed || known || (words.len() == 1 && is_acronym(words[0])) {
        return EntityLabel::Org;
    }

    EntityLabel::Misc
}
