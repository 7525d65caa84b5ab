//! LionLink - study-partner and study-session matching service
//!
//! Scores how well two students fit as study partners and how well a study
//! session fits a student, and serves both feeds over HTTP.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{score_partner, score_session, Matcher};
pub use models::{MatchAttributes, MatchScore, PartnerWeights, Profile, SessionWeights, StudySession};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let viewer = MatchAttributes {
            courses: vec!["COMS W4701".to_string()],
            ..MatchAttributes::default()
        };

        let result = score_partner(&viewer, &viewer, &PartnerWeights::default());
        assert_eq!(result.score, 80);
    }
}
