// Core algorithm exports
pub mod filters;
pub mod interest;
pub mod matcher;
pub mod normalize;
pub mod scoring;
pub mod text;

pub use filters::{enrolled_in, is_visible, matches_search};
pub use interest::InterestTransition;
pub use matcher::{Matcher, MatchResult, DEFAULT_RECOMMENDED_THRESHOLD};
pub use normalize::{attributes_from_value, normalize_profile, normalize_session, session_attributes_from_value};
pub use scoring::{score_partner, score_session};
