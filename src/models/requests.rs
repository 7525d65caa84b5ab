use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::core::text::csv_to_list;

/// A list-valued form field: either a JSON array or a comma-separated string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    List(Vec<String>),
    Csv(String),
}

impl ListField {
    pub fn into_list(self) -> Vec<String> {
        match self {
            ListField::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            ListField::Csv(raw) => csv_to_list(&raw),
        }
    }
}

/// Partial update of the caller's own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    /// Trimmed on the way in, so a blank name fails the length check
    #[validate(length(min = 1, max = 80))]
    #[serde(alias = "displayName", default, deserialize_with = "trimmed")]
    pub name: Option<String>,
    #[validate(length(max = 80))]
    #[serde(default)]
    pub major: Option<String>,
    #[validate(length(max = 40))]
    #[serde(default)]
    pub year: Option<String>,
    #[serde(alias = "courses", rename = "enrolledCourses", default)]
    pub enrolled_courses: Option<ListField>,
    #[serde(alias = "studyStyleTags", rename = "studyStyle", default)]
    pub study_style: Option<ListField>,
    #[serde(default)]
    pub availability: Option<ListField>,
    #[serde(default)]
    pub mode: Option<ListField>,
    #[serde(default)]
    pub goals: Option<ListField>,
    #[validate(length(max = 200))]
    #[serde(rename = "freeTime", default)]
    pub free_time: Option<String>,
}

impl ProfileUpdateRequest {
    /// Fields to merge into the stored document, using stored field names
    ///
    /// Only fields present in the request are written; the document identity
    /// is never part of an update.
    pub fn into_document(self) -> Value {
        let mut doc = Map::new();

        if let Some(name) = self.name {
            doc.insert("name".to_string(), Value::String(name.trim().to_string()));
        }
        if let Some(major) = self.major {
            doc.insert("major".to_string(), Value::String(major.trim().to_string()));
        }
        if let Some(year) = self.year {
            doc.insert("year".to_string(), Value::String(year.trim().to_string()));
        }
        if let Some(free_time) = self.free_time {
            doc.insert("freeTime".to_string(), Value::String(free_time.trim().to_string()));
        }

        let lists = [
            ("enrolledCourses", self.enrolled_courses),
            ("studyStyle", self.study_style),
            ("availability", self.availability),
            ("mode", self.mode),
            ("goals", self.goals),
        ];
        for (field, value) in lists {
            if let Some(value) = value {
                let items = value.into_list().into_iter().map(Value::String).collect();
                doc.insert(field.to_string(), Value::Array(items));
            }
        }

        Value::Object(doc)
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|value| value.trim().to_string()))
}

/// Host action: schedule a study session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 32))]
    #[serde(rename = "courseCode")]
    pub course_code: String,
    #[validate(length(min = 1, max = 120))]
    #[serde(rename = "courseName")]
    pub course_name: String,
    #[validate(length(max = 80))]
    #[serde(rename = "hostName", default)]
    pub host_name: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub location: String,
    #[serde(rename = "startAt")]
    pub start_at: DateTime<Utc>,
    #[serde(rename = "endAt")]
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

impl CreateSessionRequest {
    /// A session must end after it starts
    pub fn has_valid_window(&self) -> bool {
        self.end_at > self.start_at
    }
}

/// Explicit interest value
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetInterestRequest {
    pub value: bool,
}

/// Query string of the partner feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartnerFeedQuery {
    /// Course filter; `""` disables it, absent means "my first course"
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated uids dismissed on the client
    #[serde(default)]
    pub dismissed: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string of the session feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFeedQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Raw scoring input; shapes are coerced, never rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePartnerRequest {
    #[serde(default)]
    pub viewer: Value,
    #[serde(default)]
    pub candidate: Value,
}

/// Raw session scoring input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSessionRequest {
    #[serde(default)]
    pub viewer: Value,
    #[serde(default)]
    pub session: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_field_accepts_csv_and_arrays() {
        let csv: ListField = serde_json::from_value(json!("COMS W4701, , STAT GU4001")).unwrap();
        assert_eq!(csv.into_list(), vec!["COMS W4701", "STAT GU4001"]);

        let list: ListField = serde_json::from_value(json!([" quiet ", ""])).unwrap();
        assert_eq!(list.into_list(), vec!["quiet"]);
    }

    #[test]
    fn test_profile_update_document() {
        let req: ProfileUpdateRequest = serde_json::from_value(json!({
            "displayName": " Amina K ",
            "courses": "COMS W4701, COMS W3157",
            "studyStyleTags": ["pomodoro"],
            "uid": "someone-else",
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        let doc = req.into_document();

        assert_eq!(doc["name"], "Amina K");
        assert_eq!(doc["enrolledCourses"], json!(["COMS W4701", "COMS W3157"]));
        assert_eq!(doc["studyStyle"], json!(["pomodoro"]));
        assert!(doc.get("uid").is_none());
        assert!(doc.get("major").is_none());
    }

    #[test]
    fn test_profile_update_rejects_blank_name() {
        let req = ProfileUpdateRequest {
            name: Some(String::new()),
            ..ProfileUpdateRequest::default()
        };
        assert!(req.validate().is_err());

        let whitespace: ProfileUpdateRequest =
            serde_json::from_value(json!({"name": "   "})).unwrap();
        assert_eq!(whitespace.name.as_deref(), Some(""));
        assert!(whitespace.validate().is_err());

        let padded: ProfileUpdateRequest =
            serde_json::from_value(json!({"displayName": "  Sam P "})).unwrap();
        assert!(padded.validate().is_ok());
        assert_eq!(padded.name.as_deref(), Some("Sam P"));
    }

    #[test]
    fn test_create_session_window() {
        let req: CreateSessionRequest = serde_json::from_value(json!({
            "courseCode": "COMS4701",
            "courseName": "Artificial Intelligence",
            "location": "Butler 209",
            "startAt": "2025-10-09T18:00:00Z",
            "endAt": "2025-10-09T17:00:00Z",
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(!req.has_valid_window());
    }
}
