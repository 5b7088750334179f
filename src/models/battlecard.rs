use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Free-text battlecards keyed by competitor, in generation order. This is
/// the on-disk shape of `battlecards.json`.
pub type Battlecards = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battlecard {
    pub competitor: String,
    pub text: String,
}

impl Battlecard {
    pub fn all(cards: &Battlecards) -> Vec<Battlecard> {
        cards
            .iter()
            .map(|(competitor, text)| Battlecard {
                competitor: competitor.clone(),
                text: text.clone(),
            })
            .collect()
    }
}
