//! Neighbor lookup within an ordered identifier sequence.

/// Find the neighbors of `target` in `sequence`.
///
/// Returns `(previous, next)`. An absent target degrades to `(None, None)`:
/// a resource may legitimately have fallen outside the active filter since
/// the caller last saw it, so this is not an error. When the same identifier
/// appears more than once, the first occurrence is authoritative.
pub fn locate<T: Copy + PartialEq>(sequence: &[T], target: T) -> (Option<T>, Option<T>) {
    let Some(index) = sequence.iter().position(|id| *id == target) else {
        return (None, None);
    };
    let previous = index.checked_sub(1).map(|i| sequence[i]);
    let next = sequence.get(index + 1).copied();
    (previous, next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn middle_of_sequence() {
        assert_eq!(locate(&[1, 2, 3, 4], 2), (Some(1), Some(3)));
    }

    #[test]
    fn first_has_no_previous() {
        assert_eq!(locate(&[1, 2, 3, 4], 1), (None, Some(2)));
    }

    #[test]
    fn last_has_no_next() {
        assert_eq!(locate(&[1, 2, 3, 4], 4), (Some(3), None));
    }

    #[test]
    fn absent_target_degrades_silently() {
        assert_eq!(locate(&[1, 2, 3, 4], 99), (None, None));
    }

    #[test]
    fn empty_sequence() {
        assert_eq!(locate(&[], 1), (None, None));
    }

    #[test]
    fn single_element_sequence() {
        assert_eq!(locate(&[7], 7), (None, None));
    }

    #[test]
    fn duplicate_target_uses_first_occurrence() {
        assert_eq!(locate(&[1, 2, 3, 2, 5], 2), (Some(1), Some(3)));
    }
}
