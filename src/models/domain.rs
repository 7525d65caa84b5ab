use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Canonical profile of one identity, after normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub uid: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub uni: Option<String>,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(rename = "studyStyleTags", default)]
    pub study_style: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub mode: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(rename = "freeTime", default)]
    pub free_time: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Attributes the scorer consumes
    pub fn match_attributes(&self) -> MatchAttributes {
        MatchAttributes {
            courses: self.courses.clone(),
            tags: self.study_style.clone(),
            goals: self.goals.clone(),
            availability: self.availability.clone(),
        }
    }

    /// Storage shape, using the current document field names
    pub fn to_document(&self) -> Value {
        let mut doc = json!({
            "uid": self.uid,
            "name": self.display_name,
            "email": self.email,
            "uni": self.uni,
            "major": self.major,
            "year": self.year,
            "enrolledCourses": self.courses,
            "studyStyle": self.study_style,
            "availability": self.availability,
            "mode": self.mode,
            "goals": self.goals,
            "freeTime": self.free_time,
        });

        if let Some(obj) = doc.as_object_mut() {
            if let Some(created_at) = self.created_at {
                obj.insert("createdAt".to_string(), Value::String(created_at.to_rfc3339()));
            }
            if let Some(updated_at) = self.updated_at {
                obj.insert("updatedAt".to_string(), Value::String(updated_at.to_rfc3339()));
            }
        }

        doc
    }
}

/// Scheduled study meetup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: String,
    #[serde(rename = "courseCode")]
    pub course_code: String,
    #[serde(rename = "courseName")]
    pub course_name: String,
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub location: String,
    #[serde(rename = "startAt")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(rename = "endAt")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(rename = "interestedCount")]
    pub interested_count: u32,
    #[serde(rename = "createdBy", default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

impl StudySession {
    /// A session declares one course; goals and availability are optional
    pub fn match_attributes(&self) -> MatchAttributes {
        let courses = if self.course_code.is_empty() {
            Vec::new()
        } else {
            vec![self.course_code.clone()]
        };

        MatchAttributes {
            courses,
            tags: Vec::new(),
            goals: self.goals.clone(),
            availability: self.availability.clone(),
        }
    }
}

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    #[serde(rename = "emailVerified")]
    pub email_verified: bool,
}

/// Declared attributes of a viewer or candidate, as seen by the scorer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAttributes {
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
}

/// Scorer output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: u8,
    pub reasons: Vec<String>,
}

/// Partner candidate with its compatibility score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPartner {
    pub uid: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub initials: String,
    pub subtitle: String,
    pub courses: Vec<String>,
    #[serde(rename = "studyStyleTags")]
    pub study_style: Vec<String>,
    pub mode: Vec<String>,
    #[serde(rename = "freeTime")]
    pub free_time: String,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    pub reasons: Vec<String>,
}

/// Session with its score and the caller-side recommendation flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedSession {
    #[serde(flatten)]
    pub session: StudySession,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    pub reasons: Vec<String>,
    pub recommended: bool,
    #[serde(rename = "isInterested")]
    pub is_interested: bool,
}

/// Partner scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartnerWeights {
    pub baseline: i32,
    pub shared_course_bonus: i32,
    pub per_shared_tag: i32,
    pub max_tag_bonus: i32,
}

impl Default for PartnerWeights {
    fn default() -> Self {
        Self {
            baseline: 35,
            shared_course_bonus: 45,
            per_shared_tag: 7,
            max_tag_bonus: 20,
        }
    }
}

/// Session scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWeights {
    pub baseline: i32,
    pub course_match_bonus: i32,
    pub per_shared_goal: i32,
    pub max_goal_bonus: i32,
    pub availability_bonus: i32,
}

impl Default for SessionWeights {
    fn default() -> Self {
        Self {
            baseline: 0,
            course_match_bonus: 70,
            per_shared_goal: 10,
            max_goal_bonus: 20,
            availability_bonus: 10,
        }
    }
}

/// Filters applied to the partner feed before scoring
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    pub exclude_uid: Option<String>,
    pub dismissed: Vec<String>,
    pub search: Option<String>,
    pub limit: usize,
}
