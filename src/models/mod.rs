mod battlecard;
mod news;
mod profile;

pub use battlecard::{Battlecard, Battlecards};
pub use news::{
    Article, CollectedData, CompetitorDetails, KeywordTrends, OrganizedDetails, SourceResults,
};
pub use profile::{CompetitorProfile, CompetitorProfiles};
