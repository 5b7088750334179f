pub mod analyze;
pub mod collect;
pub mod design;
pub mod generate;
pub mod orchestrator;

pub use design::{DesignSummary, RenderedCard};
pub use generate::{GenerateOutcome, GenerateSettings};
pub use orchestrator::{Pipeline, RunSummary};

/// Splits comma-separated user input into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" Apple, Samsung ,,Vivo "),
            vec!["Apple", "Samsung", "Vivo"]
        );
        assert!(split_list(" , ").is_empty());
    }
}
