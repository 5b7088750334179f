use std::collections::HashSet;

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{Battlecard, Battlecards};
use crate::render::{self, Template};
use crate::store::{ArtifactStore, file_stem};
use crate::telemetry::metrics::PDFS_RENDERED;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedCard {
    pub competitor: String,
    pub pdf: String,
    /// `None` when the text copy could not be written.
    pub txt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DesignSummary {
    pub template: String,
    pub cards: Vec<RenderedCard>,
}

/// Renders every saved battlecard with the named template. Unknown names
/// use the default template.
#[tracing::instrument(
    name = "pipeline_stage design",
    skip(store),
    fields(
        pipeline.stage = "design",
        design.template,
        design.cards,
    )
)]
pub fn design_battlecards(store: &ArtifactStore, template_name: &str) -> AppResult<DesignSummary> {
    let template = Template::resolve(template_name);
    let span = tracing::Span::current();
    span.record("design.template", template.name);

    let battlecards: Battlecards = store.load_json(&store.battlecards_path())?;

    let mut cards = Vec::with_capacity(battlecards.len());
    let mut taken = HashSet::new();
    for card in Battlecard::all(&battlecards) {
        let stem = unique_stem(&mut taken, &card.competitor);
        cards.push(design_one(store, &card, &stem, template)?);
    }

    span.record("design.cards", cards.len());
    tracing::info!(template = template.name, cards = cards.len(), "Battlecards designed");

    Ok(DesignSummary {
        template: template.name.to_string(),
        cards,
    })
}

/// Sanitized file stem for a competitor, suffixed with `_2`, `_3`, ... when
/// an earlier competitor in the same run already produced it. Stems are
/// compared case-insensitively.
fn unique_stem(taken: &mut HashSet<String>, competitor: &str) -> String {
    let base = file_stem(competitor);
    let mut stem = base.clone();
    let mut n = 1;
    while !taken.insert(stem.to_lowercase()) {
        n += 1;
        stem = format!("{base}_{n}");
    }
    if n > 1 {
        tracing::warn!(
            competitor = %competitor,
            file_stem = %stem,
            "Battlecard file name already used in this run, adding a suffix"
        );
    }
    stem
}

fn design_one(
    store: &ArtifactStore,
    card: &Battlecard,
    stem: &str,
    template: &Template,
) -> AppResult<RenderedCard> {
    let bytes = render::render_battlecard(&card.competitor, &card.text, template)?;
    let pdf_path = store.card_path(stem, "pdf");
    store.write_bytes(&pdf_path, &bytes)?;
    PDFS_RENDERED.add(1, &[opentelemetry::KeyValue::new("template", template.name)]);

    let txt_path = store.card_path(stem, "txt");
    let txt = match store.write_bytes(&txt_path, card.text.as_bytes()) {
        Ok(()) => Some(file_name(&txt_path)),
        Err(e) => {
            tracing::error!(
                path = %txt_path.display(),
                error = %e,
                "Error writing battlecard text file"
            );
            None
        }
    };

    Ok(RenderedCard {
        competitor: card.competitor.clone(),
        pdf: file_name(&pdf_path),
        txt,
    })
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn store_with_cards(cards: &[(&str, &str)]) -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let battlecards: Battlecards = cards
            .iter()
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();
        store
            .save_json(&store.battlecards_path(), &battlecards)
            .unwrap();
        (dir, store)
    }

    const CARD: &str = "**Competitor Overview**\nA phone maker.\n\n**Products**\n* A\n* B\n* C\n* D\n* E\n* F";

    #[test]
    fn test_writes_pdf_and_verbatim_text() {
        let (_dir, store) = store_with_cards(&[("Vivo", CARD), ("Oppo", "no sections at all")]);

        let summary = design_battlecards(&store, "modern").unwrap();
        assert_eq!(summary.template, "modern");
        assert_eq!(summary.cards.len(), 2);
        assert_eq!(summary.cards[0].pdf, "Vivo_battlecard.pdf");
        assert_eq!(summary.cards[0].txt.as_deref(), Some("Vivo_battlecard.txt"));

        let text = std::fs::read_to_string(store.txt_path("Vivo")).unwrap();
        assert_eq!(text, CARD);
        assert!(std::fs::read(store.pdf_path("Oppo")).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_redesign_is_idempotent() {
        let (_dir, store) = store_with_cards(&[("Vivo", CARD)]);

        design_battlecards(&store, "professional").unwrap();
        let first = std::fs::read(store.pdf_path("Vivo")).unwrap();
        design_battlecards(&store, "professional").unwrap();
        let second = std::fs::read(store.pdf_path("Vivo")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_colliding_file_names_get_suffixes() {
        let (_dir, store) = store_with_cards(&[
            ("A/B", "first card"),
            ("A_B", "second card"),
            ("a_b", "third card"),
        ]);

        let summary = design_battlecards(&store, "classic").unwrap();
        let pdfs: Vec<&str> = summary.cards.iter().map(|c| c.pdf.as_str()).collect();
        assert_eq!(
            pdfs,
            vec!["A_B_battlecard.pdf", "A_B_2_battlecard.pdf", "a_b_3_battlecard.pdf"]
        );

        let first = std::fs::read_to_string(store.card_path("A_B", "txt")).unwrap();
        let second = std::fs::read_to_string(store.card_path("A_B_2", "txt")).unwrap();
        assert_eq!(first, "first card");
        assert_eq!(second, "second card");
    }

    #[test]
    fn test_unknown_template_uses_classic() {
        let (_dir, store) = store_with_cards(&[("Vivo", CARD)]);
        let summary = design_battlecards(&store, "neon").unwrap();
        assert_eq!(summary.template, "classic");
    }

    #[test]
    fn test_missing_battlecards_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            design_battlecards(&store, "classic"),
            Err(AppError::NotFound(_))
        ));
    }
}
