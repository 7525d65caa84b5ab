use serde_json::{json, Value};

use crate::services::store::{DocumentStore, StoreError};

/// Demo profiles for local development: `(uid, document)`
pub fn demo_profiles() -> Vec<(&'static str, Value)> {
    vec![
        (
            "demo1",
            json!({
                "uid": "demo1",
                "email": "demo1@columbia.edu",
                "name": "Amina K",
                "uni": "ak1234",
                "major": "Computer Science",
                "year": "Sophomore",
                "enrolledCourses": ["COMS W4701", "COMS W3157"],
                "studyStyle": ["pomodoro", "deep focus"],
                "mode": ["remote"],
                "availability": [{ "day": "Tue", "start": "18:00", "end": "20:00" }],
            }),
        ),
        (
            "demo2",
            json!({
                "uid": "demo2",
                "email": "demo2@columbia.edu",
                "name": "Jordan R",
                "uni": "jr8888",
                "major": "Data Science",
                "year": "Senior",
                "enrolledCourses": ["COMS W4701", "STAT GU4001"],
                "studyStyle": ["whiteboard", "discussion"],
                "mode": ["in-person"],
                "availability": [{ "day": "Thu", "start": "10:00", "end": "12:00" }],
            }),
        ),
        (
            "demo3",
            json!({
                "uid": "demo3",
                "email": "demo3@columbia.edu",
                "name": "Sam P",
                "uni": "sp4567",
                "major": "Economics",
                "year": "Junior",
                "enrolledCourses": ["ECON GU4211"],
                "studyStyle": ["quiet", "deep focus"],
                "mode": ["remote"],
                "availability": [{ "day": "Mon", "start": "09:00", "end": "11:00" }],
            }),
        ),
    ]
}

/// Write the demo profiles, merging so reruns keep existing fields
pub async fn seed_demo_profiles(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<usize, StoreError> {
    let profiles = demo_profiles();
    let count = profiles.len();

    for (uid, document) in profiles {
        store.put(collection, uid, document, true).await?;
    }

    tracing::info!("Seeded {} demo profiles into {}", count, collection);
    Ok(count)
}
