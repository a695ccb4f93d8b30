//! Status classification for configuration-variant groups.

use crate::types::{DisplayStatus, TestStatus};

/// Derive one display status from the statuses of a variant's runs.
///
/// Uniform input keeps its status. Mixed input surfaces failures first
/// (ignoring skips), then reports mixed success when only passes and expected
/// failures remain. Empty input has no status.
pub fn classify(statuses: &[TestStatus]) -> Option<DisplayStatus> {
    let first = *statuses.first()?;
    if statuses.iter().all(|s| *s == first) {
        return Some(first.into());
    }

    let considered = statuses.iter().filter(|s| **s != TestStatus::Skipped);
    if considered.clone().any(|s| *s == TestStatus::Failure) {
        return Some(DisplayStatus::MixedFailure);
    }

    if considered.filter(|s| **s != TestStatus::ExpectedFailure).all(|s| *s == TestStatus::Success) {
        Some(DisplayStatus::MixedSuccess)
    } else {
        Some(DisplayStatus::ExpectedFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TestStatus::*;

    #[test]
    fn test_uniform_statuses_keep_their_status() {
        assert_eq!(classify(&[Success, Success]), Some(DisplayStatus::Success));
        assert_eq!(classify(&[Failure]), Some(DisplayStatus::Failure));
        assert_eq!(classify(&[Skipped, Skipped]), Some(DisplayStatus::Skipped));
        assert_eq!(classify(&[ExpectedFailure, ExpectedFailure]), Some(DisplayStatus::ExpectedFailure));
    }

    #[test]
    fn test_any_failure_wins_over_mixed_success() {
        assert_eq!(classify(&[Success, Failure]), Some(DisplayStatus::MixedFailure));
        assert_eq!(classify(&[Skipped, Failure]), Some(DisplayStatus::MixedFailure));
        assert_eq!(classify(&[ExpectedFailure, Success, Failure]), Some(DisplayStatus::MixedFailure));
    }

    #[test]
    fn test_success_with_expected_failure_is_mixed_success() {
        assert_eq!(classify(&[Success, ExpectedFailure]), Some(DisplayStatus::MixedSuccess));
        assert_eq!(classify(&[Success, Skipped]), Some(DisplayStatus::MixedSuccess));
    }

    #[test]
    fn test_skipped_with_expected_failure_is_mixed_success() {
        // Both filters empty the remaining set, which vacuously counts as all-success.
        assert_eq!(classify(&[Skipped, ExpectedFailure]), Some(DisplayStatus::MixedSuccess));
    }

    #[test]
    fn test_empty_has_no_status() {
        assert_eq!(classify(&[]), None);
    }
}
