use crate::core::text::contains_ignore_case;
use crate::models::{PartnerFilter, Profile};

/// Check whether a partner candidate survives the feed's hard filters
///
/// Drops the viewer's own profile and anything the viewer dismissed.
#[inline]
pub fn is_visible(profile: &Profile, filter: &PartnerFilter) -> bool {
    if filter.exclude_uid.as_deref() == Some(profile.uid.as_str()) {
        return false;
    }

    !filter.dismissed.iter().any(|uid| uid == &profile.uid)
}

/// Free-text search over name, major, year, courses and study style
///
/// Case-insensitive substring match; a blank query matches everything.
#[inline]
pub fn matches_search(profile: &Profile, query: Option<&str>) -> bool {
    let query = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return true,
    };

    let mut haystack = Vec::with_capacity(3 + profile.courses.len() + profile.study_style.len());
    haystack.push(profile.display_name.as_str());
    haystack.push(profile.major.as_str());
    haystack.push(profile.year.as_str());
    haystack.extend(profile.courses.iter().map(String::as_str));
    haystack.extend(profile.study_style.iter().map(String::as_str));

    haystack.join(" ").to_lowercase().contains(&query)
}

/// Check the optional course filter of the partner feed
#[inline]
pub fn enrolled_in(profile: &Profile, course_code: Option<&str>) -> bool {
    match course_code {
        Some(code) if !code.is_empty() => contains_ignore_case(&profile.courses, code),
        _ => true,
    }
}
