use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Deduplicated entities found in a competitor's coverage. Sets keep the
/// serialized lists sorted and free of repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    pub products: BTreeSet<String>,
    pub market_trends: BTreeSet<String>,
}

pub type CompetitorProfiles = IndexMap<String, CompetitorProfile>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_sorted_unique_lists() {
        let mut profile = CompetitorProfile::default();
        for product in ["Pixel 8", "Galaxy S24", "Pixel 8"] {
            profile.products.insert(product.to_string());
        }

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "products": ["Galaxy S24", "Pixel 8"],
                "market_trends": [],
            })
        );
    }

    #[test]
    fn test_deserializes_lists_with_repeats() {
        let profile: CompetitorProfile =
            serde_json::from_str(r#"{"products": ["A", "A"], "market_trends": ["B"]}"#).unwrap();
        assert_eq!(profile.products.len(), 1);
        assert_eq!(profile.market_trends.len(), 1);
    }
}
