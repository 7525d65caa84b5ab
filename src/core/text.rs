use serde_json::Value;
use std::collections::HashSet;

/// Coerce a JSON value into a list of strings
///
/// Arrays keep only their string items; any other shape (missing field,
/// null, number, object, single string) becomes an empty list.
pub fn as_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// First field of `fields` that holds a JSON array, coerced to strings
pub fn first_list(doc: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| doc.get(*field))
        .find(|value| value.is_array())
        .map(as_string_list)
        .unwrap_or_default()
}

/// Size of the overlap of `a` and `b` taken as sets, ignoring letter case
///
/// Repeated entries count once, so the result is symmetric. Only letter case
/// is folded: whitespace and punctuation must match exactly.
#[inline]
pub fn intersection_count(a: &[String], b: &[String]) -> usize {
    let left: HashSet<String> = a.iter().map(|item| item.to_lowercase()).collect();
    let right: HashSet<String> = b.iter().map(|item| item.to_lowercase()).collect();

    left.intersection(&right).count()
}

/// Case-insensitive membership test
#[inline]
pub fn contains_ignore_case(items: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    items.iter().any(|item| item.to_lowercase() == needle)
}

/// Parse a comma-separated form field into a trimmed list
pub fn csv_to_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derive a readable display name from an email address
///
/// `"ps3358@columbia.edu"` becomes `"Ps3358"`, `"amina.k@x.edu"` becomes `"Amina K"`.
pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    let words: Vec<String> = local
        .split(|c: char| c == '.' || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        "Student".to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First whitespace-separated word of a display name
pub fn first_name(name: &str) -> String {
    name.split_whitespace().next().unwrap_or_default().to_string()
}

/// Up to two uppercase initials for an avatar, `"?"` when the name is blank
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_as_string_list_drops_non_strings() {
        assert_eq!(as_string_list(&json!(["a", 1, null, "b"])), list(&["a", "b"]));
        assert!(as_string_list(&json!("a,b")).is_empty());
        assert!(as_string_list(&json!({"a": 1})).is_empty());
        assert!(as_string_list(&Value::Null).is_empty());
    }

    #[test]
    fn test_first_list_prefers_earlier_fields() {
        let doc = json!({"enrolledCourses": ["COMS4701"], "courses": ["OLD"]});
        assert_eq!(first_list(&doc, &["enrolledCourses", "courses"]), list(&["COMS4701"]));

        let legacy = json!({"enrolledCourses": "oops", "courses": ["OLD"]});
        assert_eq!(first_list(&legacy, &["enrolledCourses", "courses"]), list(&["OLD"]));

        assert!(first_list(&json!({}), &["enrolledCourses", "courses"]).is_empty());
    }

    #[test]
    fn test_intersection_is_case_insensitive() {
        assert_eq!(intersection_count(&list(&["CS101"]), &list(&["cs101"])), 1);
        assert_eq!(intersection_count(&list(&["Deep Focus", "quiet"]), &list(&["deep focus"])), 1);
    }

    #[test]
    fn test_intersection_ignores_duplicates_and_order() {
        let doubled = list(&["pomodoro", "Pomodoro"]);
        let single = list(&["pomodoro"]);

        assert_eq!(intersection_count(&doubled, &single), 1);
        assert_eq!(intersection_count(&single, &doubled), 1);
        assert_eq!(intersection_count(&list(&["a", "b", "b"]), &list(&["B", "c"])), 1);
    }

    #[test]
    fn test_intersection_does_not_normalize_whitespace() {
        assert_eq!(intersection_count(&list(&["COMS 4701"]), &list(&["COMS4701"])), 0);
        assert_eq!(intersection_count(&list(&["pomodoro "]), &list(&["pomodoro"])), 0);
    }

    #[test]
    fn test_csv_to_list() {
        assert_eq!(csv_to_list(" a, ,b "), list(&["a", "b"]));
        assert!(csv_to_list("").is_empty());
        assert!(csv_to_list(" , ,").is_empty());
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("ps3358@columbia.edu"), "Ps3358");
        assert_eq!(name_from_email("amina.k@columbia.edu"), "Amina K");
        assert_eq!(name_from_email("jo__r-x@columbia.edu"), "Jo R X");
        assert_eq!(name_from_email("@columbia.edu"), "Student");
    }

    #[test]
    fn test_first_name_and_initials() {
        assert_eq!(first_name("  Amina K "), "Amina");
        assert_eq!(first_name(""), "");
        assert_eq!(initials("amina k"), "AK");
        assert_eq!(initials("Jordan Lee Reyes"), "JL");
        assert_eq!(initials("   "), "?");
    }
}
