use std::collections::HashSet;

use crate::core::{
    filters::{is_visible, matches_search},
    scoring::{score_partner, score_session},
    text::initials,
};
use crate::models::{
    PartnerFilter, PartnerWeights, Profile, RecommendedSession, ScoredPartner, SessionWeights,
    StudySession,
};

/// Default score at or above which a session is flagged "recommended"
pub const DEFAULT_RECOMMENDED_THRESHOLD: u8 = 70;

/// Result of ranking the partner feed
#[derive(Debug)]
pub struct MatchResult {
    pub partners: Vec<ScoredPartner>,
    pub total_candidates: usize,
}

/// Feed orchestrator - applies filters, the scorer, and presentation policy
///
/// # Partner feed stages
/// 1. Drop the viewer and dismissed candidates
/// 2. Free-text search
/// 3. Scoring
/// 4. Ranking and truncation to the feed cap
#[derive(Debug, Clone)]
pub struct Matcher {
    partner_weights: PartnerWeights,
    session_weights: SessionWeights,
    recommended_threshold: u8,
}

impl Matcher {
    pub fn new(
        partner_weights: PartnerWeights,
        session_weights: SessionWeights,
        recommended_threshold: u8,
    ) -> Self {
        Self {
            partner_weights,
            session_weights,
            recommended_threshold,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(
            PartnerWeights::default(),
            SessionWeights::default(),
            DEFAULT_RECOMMENDED_THRESHOLD,
        )
    }

    pub fn partner_weights(&self) -> &PartnerWeights {
        &self.partner_weights
    }

    pub fn session_weights(&self) -> &SessionWeights {
        &self.session_weights
    }

    /// Presentation policy: whether a session score earns the banner
    pub fn is_recommended(&self, score: u8) -> bool {
        score >= self.recommended_threshold
    }

    /// Score and rank partner candidates for a viewer
    ///
    /// # Arguments
    /// * `viewer` - The signed-in user's profile
    /// * `candidates` - Profiles from the live partner query
    /// * `filter` - Exclusions, search text, and result cap
    ///
    /// # Returns
    /// MatchResult with partners sorted by score (descending), then name
    pub fn rank_partners(
        &self,
        viewer: &Profile,
        candidates: Vec<Profile>,
        filter: &PartnerFilter,
    ) -> MatchResult {
        let total_candidates = candidates.len();
        let viewer_attrs = viewer.match_attributes();

        let mut partners: Vec<ScoredPartner> = candidates
            .into_iter()
            // Stage 1: Self and dismissed
            .filter(|profile| is_visible(profile, filter))
            // Stage 2: Search
            .filter(|profile| matches_search(profile, filter.search.as_deref()))
            // Stage 3: Scoring
            .map(|profile| {
                let result = score_partner(
                    &viewer_attrs,
                    &profile.match_attributes(),
                    &self.partner_weights,
                );

                let subtitle = [profile.year.as_str(), profile.major.as_str()]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ");

                ScoredPartner {
                    initials: initials(&profile.display_name),
                    subtitle,
                    uid: profile.uid,
                    display_name: profile.display_name,
                    courses: profile.courses,
                    study_style: profile.study_style,
                    mode: profile.mode,
                    free_time: profile.free_time,
                    match_score: result.score,
                    reasons: result.reasons,
                }
            })
            .collect();

        // Stage 4: Rank by score (descending) and then by name
        partners.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });

        partners.truncate(filter.limit);

        MatchResult {
            partners,
            total_candidates,
        }
    }

    /// Score sessions for a viewer and flag the recommended ones
    ///
    /// Sessions are returned by start time (ascending), undated ones last.
    pub fn annotate_sessions(
        &self,
        viewer: &Profile,
        sessions: Vec<StudySession>,
        interested: &HashSet<String>,
    ) -> Vec<RecommendedSession> {
        let viewer_attrs = viewer.match_attributes();

        let mut annotated: Vec<RecommendedSession> = sessions
            .into_iter()
            .map(|session| {
                let result = score_session(
                    &viewer_attrs,
                    &session.match_attributes(),
                    &self.session_weights,
                );

                RecommendedSession {
                    is_interested: interested.contains(&session.id),
                    recommended: self.is_recommended(result.score),
                    match_score: result.score,
                    reasons: result.reasons,
                    session,
                }
            })
            .collect();

        annotated.sort_by_key(|s| (s.session.start_at.is_none(), s.session.start_at));

        annotated
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
