/// Outcome of applying an interest change to a session's counter
///
/// The marker and the counter move together: adding a marker adds one,
/// removing a marker removes one (never below zero), and a request that
/// leaves the marker unchanged leaves the counter unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestTransition {
    pub interested: bool,
    pub count: u32,
    pub changed: bool,
}

impl InterestTransition {
    /// Flip the marker
    pub fn toggle(count: u32, was_interested: bool) -> Self {
        Self::set(count, was_interested, !was_interested)
    }

    /// Move the marker to `want`
    pub fn set(count: u32, was_interested: bool, want: bool) -> Self {
        let count = match (was_interested, want) {
            (false, true) => count.saturating_add(1),
            (true, false) => count.saturating_sub(1),
            _ => count,
        };

        Self {
            interested: want,
            count,
            changed: was_interested != want,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_on_and_off() {
        let on = InterestTransition::toggle(5, false);
        assert_eq!(on, InterestTransition { interested: true, count: 6, changed: true });

        let off = InterestTransition::toggle(on.count, on.interested);
        assert_eq!(off, InterestTransition { interested: false, count: 5, changed: true });
    }

    #[test]
    fn test_count_never_negative() {
        // Marker present but counter already drifted to zero
        let off = InterestTransition::toggle(0, true);
        assert_eq!(off.count, 0);
        assert!(!off.interested);
    }

    #[test]
    fn test_set_is_idempotent() {
        let first = InterestTransition::set(3, false, true);
        let again = InterestTransition::set(first.count, first.interested, true);

        assert_eq!(first.count, 4);
        assert_eq!(again.count, 4);
        assert!(!again.changed);

        let noop = InterestTransition::set(3, false, false);
        assert_eq!(noop.count, 3);
        assert!(!noop.changed);
    }

    #[test]
    fn test_at_most_one_adjustment() {
        for count in [0u32, 1, 7, u32::MAX] {
            for was in [false, true] {
                let next = InterestTransition::toggle(count, was);
                assert!(next.count.abs_diff(count) <= 1);
            }
        }
    }
}
