use crate::core::text::{contains_ignore_case, intersection_count};
use crate::models::{MatchAttributes, MatchScore, PartnerWeights, SessionWeights};

/// Calculate a partner compatibility score (0-100) with its reasons
///
/// Scoring formula:
/// score = clamp(
///     baseline +                                   # 35, nobody shows as 0%
///     shared_course_bonus * any_shared_course +    # 45, flat once
///     min(max_tag_bonus, shared_tags * per_tag)    # min(20, n * 7)
/// , 0, 100)
///
/// One shared course is worth as much as several; shared style tags add
/// incremental value up to the cap.
pub fn score_partner(
    viewer: &MatchAttributes,
    candidate: &MatchAttributes,
    weights: &PartnerWeights,
) -> MatchScore {
    let mut score = weights.baseline;
    let mut reasons = Vec::new();

    // Stage 1: Courses
    let shared_courses = intersection_count(&viewer.courses, &candidate.courses);
    if shared_courses > 0 {
        score = score.saturating_add(weights.shared_course_bonus);
        reasons.push(count_reason(shared_courses, "shared course", "shared courses"));
    }

    // Stage 2: Study style tags
    let shared_tags = intersection_count(&viewer.tags, &candidate.tags);
    if shared_tags > 0 {
        score = score.saturating_add(proportional_bonus(
            shared_tags,
            weights.per_shared_tag,
            weights.max_tag_bonus,
        ));
        reasons.push(count_reason(shared_tags, "shared style tag", "shared style tags"));
    }

    MatchScore {
        score: clamp_score(score),
        reasons,
    }
}

/// Calculate a session compatibility score (0-100) with its reasons
///
/// Scoring formula:
/// score = clamp(
///     baseline +                                    # 0
///     course_match_bonus * enrolled_in_course +     # 70
///     min(max_goal_bonus, shared_goals * per_goal) + # min(20, n * 10)
///     availability_bonus * any_shared_slot          # 10
/// , 0, 100)
pub fn score_session(
    viewer: &MatchAttributes,
    session: &MatchAttributes,
    weights: &SessionWeights,
) -> MatchScore {
    let mut score = weights.baseline;
    let mut reasons = Vec::new();

    // Stage 1: Viewer enrolled in the session's course
    let enrolled = session
        .courses
        .iter()
        .any(|code| contains_ignore_case(&viewer.courses, code));
    if enrolled {
        score = score.saturating_add(weights.course_match_bonus);
        reasons.push("In your courses".to_string());
    }

    // Stage 2: Goals
    let shared_goals = intersection_count(&viewer.goals, &session.goals);
    if shared_goals > 0 {
        score = score.saturating_add(proportional_bonus(
            shared_goals,
            weights.per_shared_goal,
            weights.max_goal_bonus,
        ));
        reasons.push(count_reason(shared_goals, "shared goal", "shared goals"));
    }

    // Stage 3: Availability
    if intersection_count(&viewer.availability, &session.availability) > 0 {
        score = score.saturating_add(weights.availability_bonus);
        reasons.push("Fits your schedule".to_string());
    }

    MatchScore {
        score: clamp_score(score),
        reasons,
    }
}

#[inline]
fn proportional_bonus(count: usize, per_item: i32, cap: i32) -> i32 {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    count.saturating_mul(per_item).min(cap)
}

#[inline]
fn clamp_score(score: i32) -> u8 {
    // Bounded to [0, 100] so the cast cannot truncate
    score.clamp(0, 100) as u8
}

fn count_reason(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(courses: &[&str], tags: &[&str]) -> MatchAttributes {
        MatchAttributes {
            courses: courses.iter().map(|s| s.to_string()).collect(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            goals: vec![],
            availability: vec![],
        }
    }

    #[test]
    fn test_partner_shared_course_and_tag() {
        let viewer = attrs(&["COMS4701"], &["pomodoro"]);
        let candidate = attrs(&["COMS4701"], &["pomodoro", "quiet"]);

        let result = score_partner(&viewer, &candidate, &PartnerWeights::default());

        assert_eq!(result.score, 87);
        assert_eq!(result.reasons, vec!["1 shared course", "1 shared style tag"]);
    }

    #[test]
    fn test_partner_no_overlap_keeps_baseline() {
        let result = score_partner(&attrs(&[], &[]), &attrs(&[], &[]), &PartnerWeights::default());

        assert_eq!(result.score, 35);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_partner_course_bonus_is_flat() {
        let weights = PartnerWeights::default();
        let one = score_partner(&attrs(&["A", "B"], &[]), &attrs(&["A"], &[]), &weights);
        let two = score_partner(&attrs(&["A", "B"], &[]), &attrs(&["A", "B"], &[]), &weights);

        assert_eq!(one.score, 80);
        assert_eq!(two.score, 80);
        assert_eq!(two.reasons, vec!["2 shared courses"]);
    }

    #[test]
    fn test_partner_tag_bonus_is_capped() {
        let weights = PartnerWeights::default();
        let viewer = attrs(&[], &["a", "b", "c", "d"]);

        let two = score_partner(&viewer, &attrs(&[], &["a", "b"]), &weights);
        let three = score_partner(&viewer, &attrs(&[], &["a", "b", "c"]), &weights);
        let four = score_partner(&viewer, &attrs(&[], &["a", "b", "c", "d"]), &weights);

        assert_eq!(two.score, 35 + 14);
        assert_eq!(three.score, 35 + 20);
        assert_eq!(four.score, 35 + 20);
        assert_eq!(four.reasons, vec!["4 shared style tags"]);
    }

    #[test]
    fn test_partner_case_insensitive_course() {
        let weights = PartnerWeights::default();
        let mixed = score_partner(&attrs(&["CS101"], &[]), &attrs(&["cs101"], &[]), &weights);
        let exact = score_partner(&attrs(&["CS101"], &[]), &attrs(&["CS101"], &[]), &weights);

        assert_eq!(mixed, exact);
    }

    #[test]
    fn test_partner_score_clamped_with_large_weights() {
        let weights = PartnerWeights {
            baseline: 90,
            shared_course_bonus: 90,
            per_shared_tag: 50,
            max_tag_bonus: 100,
        };
        let result = score_partner(&attrs(&["A"], &["x"]), &attrs(&["A"], &["x"]), &weights);
        assert_eq!(result.score, 100);

        let negative = PartnerWeights {
            baseline: -50,
            ..PartnerWeights::default()
        };
        let result = score_partner(&attrs(&[], &[]), &attrs(&[], &[]), &negative);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_extreme_weights_saturate() {
        let max = PartnerWeights {
            baseline: i32::MAX,
            shared_course_bonus: i32::MAX,
            per_shared_tag: i32::MAX,
            max_tag_bonus: i32::MAX,
        };
        let result = score_partner(&attrs(&["A"], &["x"]), &attrs(&["A"], &["x"]), &max);
        assert_eq!(result.score, 100);

        let min = PartnerWeights {
            baseline: i32::MIN,
            shared_course_bonus: i32::MIN,
            per_shared_tag: i32::MIN,
            max_tag_bonus: i32::MIN,
        };
        let result = score_partner(&attrs(&["A"], &["x"]), &attrs(&["A"], &["x"]), &min);
        assert_eq!(result.score, 0);

        let session = SessionWeights {
            baseline: i32::MAX,
            course_match_bonus: i32::MAX,
            per_shared_goal: i32::MAX,
            max_goal_bonus: i32::MAX,
            availability_bonus: i32::MAX,
        };
        let full = MatchAttributes {
            courses: vec!["A".to_string()],
            tags: vec![],
            goals: vec!["exam".to_string()],
            availability: vec!["Tue".to_string()],
        };
        assert_eq!(score_session(&full, &full, &session).score, 100);
    }

    #[test]
    fn test_duplicates_do_not_change_the_score() {
        let weights = PartnerWeights::default();
        let doubled = attrs(&["COMS4701", "coms4701"], &["pomodoro", "Pomodoro"]);
        let single = attrs(&["COMS4701"], &["pomodoro"]);

        let forward = score_partner(&doubled, &single, &weights);
        let backward = score_partner(&single, &doubled, &weights);
        let plain = score_partner(&single, &single, &weights);

        assert_eq!(forward, backward);
        assert_eq!(forward, plain);
        assert_eq!(forward.score, 87);
        assert_eq!(forward.reasons, vec!["1 shared course", "1 shared style tag"]);
    }

    #[test]
    fn test_session_course_match() {
        let viewer = attrs(&["COMS4701"], &[]);
        let session = attrs(&["COMS4701"], &[]);

        let result = score_session(&viewer, &session, &SessionWeights::default());

        assert_eq!(result.score, 70);
        assert_eq!(result.reasons, vec!["In your courses"]);
    }

    #[test]
    fn test_session_goals_and_availability() {
        let mut viewer = attrs(&["coms4701"], &[]);
        viewer.goals = vec!["midterm".into(), "homework".into(), "project".into()];
        viewer.availability = vec!["Tue evening".into()];

        let mut session = attrs(&["COMS4701"], &[]);
        session.goals = vec!["Midterm".into(), "Homework".into(), "project".into()];
        session.availability = vec!["tue evening".into()];

        let result = score_session(&viewer, &session, &SessionWeights::default());

        assert_eq!(result.score, 100);
        assert_eq!(
            result.reasons,
            vec!["In your courses", "3 shared goals", "Fits your schedule"]
        );
    }

    #[test]
    fn test_session_without_overlap() {
        let result = score_session(
            &attrs(&["ECON1105"], &[]),
            &attrs(&["COMS4701"], &[]),
            &SessionWeights::default(),
        );

        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }
}
