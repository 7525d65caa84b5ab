// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Identity, MatchAttributes, MatchScore, PartnerFilter, PartnerWeights, Profile,
    RecommendedSession, ScoredPartner, SessionWeights, StudySession,
};
pub use requests::{
    CreateSessionRequest, ListField, PartnerFeedQuery, ProfileUpdateRequest, ScorePartnerRequest,
    ScoreSessionRequest, SessionFeedQuery, SetInterestRequest,
};
pub use responses::{
    ErrorResponse, HealthResponse, InterestResponse, PartnerFeedResponse, ScoreResponse,
    SeedResponse, SessionFeedResponse,
};
