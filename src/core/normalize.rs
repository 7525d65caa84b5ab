//! Normalization boundary between stored documents and canonical types
//!
//! Stored documents drifted over time (`name` vs `displayName`,
//! `enrolledCourses` vs `courses`, `studyStyle` vs `studyStyleTags`) and the
//! store does not enforce types. Every document passes through here before
//! any other code sees it, and nothing here can fail.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::core::text::{as_string_list, first_list};
use crate::models::{MatchAttributes, Profile, StudySession};

const DEFAULT_DISPLAY_NAME: &str = "Student";

const COURSE_FIELDS: &[&str] = &["enrolledCourses", "courses"];
const STYLE_FIELDS: &[&str] = &["studyStyle", "studyStyleTags", "tags"];

/// Map a stored user document onto a [`Profile`]
pub fn normalize_profile(uid: &str, doc: &Value) -> Profile {
    let display_name = first_string(doc, &["name", "displayName"])
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

    Profile {
        uid: uid.to_string(),
        display_name,
        email: first_string(doc, &["email"]),
        uni: first_string(doc, &["uni"]),
        major: string_field(doc, "major"),
        year: string_field(doc, "year"),
        courses: first_list(doc, COURSE_FIELDS),
        study_style: first_list(doc, STYLE_FIELDS),
        availability: availability_list(doc.get("availability")),
        mode: first_list(doc, &["mode"]),
        goals: first_list(doc, &["goals"]),
        free_time: string_field(doc, "freeTime"),
        created_at: doc.get("createdAt").and_then(parse_instant),
        updated_at: doc.get("updatedAt").and_then(parse_instant),
    }
}

/// Map a stored session document onto a [`StudySession`]
pub fn normalize_session(id: &str, doc: &Value) -> StudySession {
    StudySession {
        id: id.to_string(),
        course_code: string_field(doc, "courseCode"),
        course_name: string_field(doc, "courseName"),
        host_name: string_field(doc, "hostName"),
        location: string_field(doc, "location"),
        start_at: doc.get("startAt").and_then(parse_instant),
        end_at: doc.get("endAt").and_then(parse_instant),
        interested_count: counter(doc.get("interestedCount")),
        created_by: first_string(doc, &["createdBy"]),
        goals: first_list(doc, &["goals"]),
        availability: availability_list(doc.get("availability")),
    }
}

/// Read scorer attributes from loosely shaped JSON
///
/// Accepts both the short names (`courses`, `tags`) and the stored document
/// names; anything missing or not an array is an empty set.
pub fn attributes_from_value(value: &Value) -> MatchAttributes {
    MatchAttributes {
        courses: first_list(value, &["courses", "enrolledCourses"]),
        tags: first_list(value, &["tags", "studyStyleTags", "studyStyle"]),
        goals: first_list(value, &["goals"]),
        availability: availability_list(value.get("availability")),
    }
}

/// Session attributes from loosely shaped JSON (a stored session document)
pub fn session_attributes_from_value(value: &Value) -> MatchAttributes {
    normalize_session("", value).match_attributes()
}

fn first_string(doc: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| doc.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_field(doc: &Value, field: &str) -> String {
    doc.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn counter(value: Option<&Value>) -> u32 {
    let Some(value) = value else { return 0 };

    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }

    // Floats and negatives from hand-edited documents
    value
        .as_f64()
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

/// Availability entries are either plain tags or `{day, start, end}` slots
fn availability_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(tag) => Some(tag.clone()),
            Value::Object(_) => {
                let day = item.get("day").and_then(Value::as_str)?;
                let start = item.get("start").and_then(Value::as_str).unwrap_or_default();
                let end = item.get("end").and_then(Value::as_str).unwrap_or_default();
                if start.is_empty() || end.is_empty() {
                    Some(day.to_string())
                } else {
                    Some(format!("{} {}-{}", day, start, end))
                }
            }
            _ => None,
        })
        .collect()
}

/// Instants arrive as RFC 3339 strings, `{seconds, nanoseconds}` objects,
/// or epoch milliseconds
pub fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        Value::Object(_) => {
            let seconds = value
                .get("seconds")
                .or_else(|| value.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = value
                .get("nanoseconds")
                .or_else(|| value.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_prefers_current_field_names() {
        let doc = json!({
            "name": "Amina K",
            "displayName": "Old Name",
            "enrolledCourses": ["COMS W4701"],
            "courses": ["LEGACY"],
            "studyStyle": ["pomodoro"],
            "major": "Computer Science",
        });

        let profile = normalize_profile("demo1", &doc);

        assert_eq!(profile.uid, "demo1");
        assert_eq!(profile.display_name, "Amina K");
        assert_eq!(profile.courses, vec!["COMS W4701"]);
        assert_eq!(profile.study_style, vec!["pomodoro"]);
        assert_eq!(profile.major, "Computer Science");
        assert_eq!(profile.year, "");
    }

    #[test]
    fn test_profile_falls_back_to_legacy_fields() {
        let doc = json!({
            "name": "   ",
            "displayName": "Jordan R",
            "courses": ["STAT GU4001", 42],
            "studyStyleTags": ["whiteboard"],
        });

        let profile = normalize_profile("demo2", &doc);

        assert_eq!(profile.display_name, "Jordan R");
        assert_eq!(profile.courses, vec!["STAT GU4001"]);
        assert_eq!(profile.study_style, vec!["whiteboard"]);
    }

    #[test]
    fn test_profile_from_garbage() {
        let profile = normalize_profile("x", &json!("not an object"));

        assert_eq!(profile.display_name, "Student");
        assert!(profile.courses.is_empty());
        assert!(profile.study_style.is_empty());
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn test_availability_slots() {
        let doc = json!({
            "availability": [
                {"day": "Tue", "start": "18:00", "end": "20:00"},
                {"day": "Fri"},
                "weekends",
                {"start": "09:00"},
                7
            ]
        });

        let profile = normalize_profile("u", &doc);

        assert_eq!(profile.availability, vec!["Tue 18:00-20:00", "Fri", "weekends"]);
    }

    #[test]
    fn test_session_normalization() {
        let doc = json!({
            "courseCode": "COMS4701",
            "courseName": "Artificial Intelligence",
            "hostName": "Sam P",
            "location": "Butler 209",
            "startAt": {"seconds": 1_760_000_000, "nanoseconds": 0},
            "endAt": "2025-10-09T10:00:00Z",
            "interestedCount": -3,
        });

        let session = normalize_session("s1", &doc);

        assert_eq!(session.id, "s1");
        assert_eq!(session.course_code, "COMS4701");
        assert_eq!(session.interested_count, 0);
        assert_eq!(session.start_at.map(|t| t.timestamp()), Some(1_760_000_000));
        assert!(session.end_at.is_some());
        assert_eq!(session.match_attributes().courses, vec!["COMS4701"]);
    }

    #[test]
    fn test_counter_coercion() {
        assert_eq!(counter(Some(&json!(5))), 5);
        assert_eq!(counter(Some(&json!(2.0))), 2);
        assert_eq!(counter(Some(&json!("5"))), 0);
        assert_eq!(counter(None), 0);
    }

    #[test]
    fn test_attributes_from_value_tolerates_bad_shapes() {
        let attrs = attributes_from_value(&json!({"courses": "COMS4701", "tags": null}));
        assert!(attrs.courses.is_empty());
        assert!(attrs.tags.is_empty());

        let attrs = attributes_from_value(&json!({"studyStyleTags": ["quiet"]}));
        assert_eq!(attrs.tags, vec!["quiet"]);

        let attrs = attributes_from_value(&Value::Null);
        assert_eq!(attrs, MatchAttributes::default());
    }

    #[test]
    fn test_parse_instant_forms() {
        assert!(parse_instant(&json!("2025-01-01T00:00:00Z")).is_some());
        assert!(parse_instant(&json!(1_735_689_600_000i64)).is_some());
        assert!(parse_instant(&json!({"_seconds": 1_735_689_600})).is_some());
        assert!(parse_instant(&json!("yesterday")).is_none());
        assert!(parse_instant(&json!(true)).is_none());
    }
}
