// SPDX-License-Identifier: PMPL-1.0-or-later

//! Eligibility checks for auto-merge
//!
//! The two predicates are pure and run before any network fetch, so a PR
//! touching only out-of-scope files costs no API calls beyond the initial
//! comparison. `check_document` then validates the content of each diff.

use crate::diff::FileDiff;
use crate::error::ErrorLog;
use crate::github::FileChange;
use crate::patterns;

/// Statuses a document may hold and still be auto-merged. Anything later in
/// the governance lifecycle requires manual editor review.
pub const ALLOWED_STATUSES: [&str; 3] = ["draft", "review", "last call"];

/// Change status of a brand-new file in a comparison.
pub const FILE_STATUS_ADDED: &str = "added";

/// A brand-new document cannot be auto-merged; there is no prior version to
/// diff against.
pub fn is_file_preexisting(file: &FileChange) -> bool {
    file.status != FILE_STATUS_ADDED
}

/// True iff the path matches `EIPS/eip-<digits>.md` exactly.
pub fn is_valid_eip_filename(file: &FileChange) -> bool {
    patterns::eip_filename_re().is_match(&file.filename)
}

/// Validate one document diff, appending any violations to the log.
pub fn check_document(diff: &FileDiff, errors: &mut ErrorLog) {
    let filename_number = patterns::filename_eip_number(&diff.filename);
    let head_matches_self = filename_number == Some(diff.head.number);

    if !head_matches_self {
        errors.push(format!(
            "EIP header in {} does not match its filename number",
            diff.name()
        ));
    }

    if head_matches_self && diff.base.number != diff.head.number {
        errors.push(format!(
            "Base EIP has number {} which was changed to head {}; EIP number changing is not allowed",
            diff.base.number, diff.head.number
        ));
    }

    if diff.head.status != diff.base.status {
        errors.push(format!(
            "Trying to change EIP {} state from {} to {}",
            diff.head.number, diff.base.status, diff.head.status
        ));
    } else if !ALLOWED_STATUSES.contains(&diff.head.status.as_str()) {
        errors.push(format!(
            "{} is in state {}, not {}",
            diff.name(),
            diff.head.status,
            ALLOWED_STATUSES.join(" or ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DocumentMetadata;

    fn change(filename: &str, status: &str) -> FileChange {
        FileChange {
            filename: filename.to_string(),
            status: status.to_string(),
            contents_url: "https://example.invalid/contents".to_string(),
        }
    }

    fn diff(number: u64, base_status: &str, head_status: &str) -> FileDiff {
        let metadata = |status: &str| DocumentMetadata {
            number,
            status: status.to_string(),
            authors: ["@alice".to_string()].into_iter().collect(),
        };
        FileDiff {
            filename: format!("EIPS/eip-{}.md", number),
            base: metadata(base_status),
            head: metadata(head_status),
        }
    }

    #[test]
    fn test_added_files_are_not_preexisting() {
        assert!(!is_file_preexisting(&change("EIPS/eip-1.md", "added")));
        assert!(is_file_preexisting(&change("EIPS/eip-1.md", "modified")));
        assert!(is_file_preexisting(&change("EIPS/eip-1.md", "renamed")));
    }

    #[test]
    fn test_filename_filter() {
        assert!(is_valid_eip_filename(&change("EIPS/eip-1234.md", "modified")));
        assert!(!is_valid_eip_filename(&change("README.md", "modified")));
        assert!(!is_valid_eip_filename(&change("eips/eip-1234.md", "modified")));
    }

    #[test]
    fn test_allowed_statuses_pass() {
        for status in ALLOWED_STATUSES {
            let mut errors = ErrorLog::new();
            check_document(&diff(1234, status, status), &mut errors);
            assert!(errors.is_empty(), "status '{}' should pass", status);
        }
    }

    #[test]
    fn test_disallowed_status_recorded() {
        let mut errors = ErrorLog::new();
        check_document(&diff(1234, "final", "final"), &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.entries()[0].contains("eip-1234.md is in state final"));
    }

    #[test]
    fn test_status_change_recorded() {
        let mut errors = ErrorLog::new();
        check_document(&diff(1234, "draft", "review"), &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.entries()[0]
            .contains("Trying to change EIP 1234 state from draft to review"));
    }

    #[test]
    fn test_number_change_recorded() {
        let metadata = |number: u64| DocumentMetadata {
            number,
            status: "draft".to_string(),
            authors: ["@alice".to_string()].into_iter().collect(),
        };
        let diff = FileDiff {
            filename: "EIPS/eip-2.md".to_string(),
            base: metadata(1),
            head: metadata(2),
        };

        let mut errors = ErrorLog::new();
        check_document(&diff, &mut errors);
        assert!(errors
            .entries()
            .iter()
            .any(|e| e.contains("EIP number changing is not allowed")));
    }

    #[test]
    fn test_header_filename_mismatch_recorded() {
        let metadata = DocumentMetadata {
            number: 99,
            status: "draft".to_string(),
            authors: ["@alice".to_string()].into_iter().collect(),
        };
        let diff = FileDiff {
            filename: "EIPS/eip-1.md".to_string(),
            base: metadata.clone(),
            head: metadata,
        };

        let mut errors = ErrorLog::new();
        check_document(&diff, &mut errors);
        assert!(errors
            .entries()
            .iter()
            .any(|e| e.contains("does not match its filename number")));
    }
}
