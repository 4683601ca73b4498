//! Report assembly.
//!
//! Per-file results are merged into a single report; issues are ordered
//! canonically by `(file, start offset, rule id)` so identical inputs
//! produce bit-identical output. Threshold policy (exit codes,
//! `--max-warnings`) belongs to the caller; the report only exposes the
//! list and severity tallies.

use crate::diagnostics::{Issue, Severity};
use serde::Serialize;

/// Result of analyzing one file.
#[derive(Debug, Default)]
pub struct FileReport {
    pub issues: Vec<Issue>,
    /// Set when the run was canceled before the file completed.
    pub partial: bool,
}

/// Aggregated result of a run over many files.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub issues: Vec<Issue>,
    pub partial: bool,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's report in. Call [`Report::finish`] after the last.
    pub fn merge(&mut self, file_report: FileReport) {
        self.issues.extend(file_report.issues);
        self.partial |= file_report.partial;
    }

    /// Add resolution notices or other caller-side issues.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    /// Canonically order the merged issues.
    pub fn finish(&mut self) {
        sort_issues(&mut self.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for issue in &self.issues {
            match issue.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
                Severity::Off => {}
            }
        }
        counts
    }

    /// Issues at or above a severity threshold.
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity >= severity)
    }
}

/// Tally of issues by severity.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// Canonical issue order: `(file, start offset, rule id)`.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.span.start.offset.cmp(&b.span.start.offset))
            .then(a.rule_id.cmp(&b.rule_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Category;
    use solstice_ast::{Position, Span};
    use std::path::PathBuf;

    fn issue(file: &str, offset: u32, rule_id: &str, severity: Severity) -> Issue {
        let pos = Position::new(1, offset + 1, offset);
        Issue {
            rule_id: rule_id.to_string(),
            category: Category::Lint,
            severity,
            message: String::new(),
            file: PathBuf::from(file),
            span: Span::new(pos, pos),
            suggestion: None,
            data: None,
        }
    }

    #[test]
    fn canonical_sort_is_total_and_stable() {
        let mut issues = vec![
            issue("b.sol", 0, "lint/b", Severity::Warning),
            issue("a.sol", 9, "lint/z", Severity::Warning),
            issue("a.sol", 9, "lint/a", Severity::Warning),
            issue("a.sol", 2, "lint/m", Severity::Warning),
        ];
        sort_issues(&mut issues);

        let keys: Vec<_> = issues
            .iter()
            .map(|i| (i.file.clone(), i.span.start.offset, i.rule_id.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (PathBuf::from("a.sol"), 2, "lint/m".to_string()),
                (PathBuf::from("a.sol"), 9, "lint/a".to_string()),
                (PathBuf::from("a.sol"), 9, "lint/z".to_string()),
                (PathBuf::from("b.sol"), 0, "lint/b".to_string()),
            ]
        );

        // Sorting again changes nothing.
        let before: Vec<_> = issues.iter().map(|i| i.rule_id.clone()).collect();
        sort_issues(&mut issues);
        let after: Vec<_> = issues.iter().map(|i| i.rule_id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn counts_and_thresholds() {
        let mut report = Report::new();
        report.merge(FileReport {
            issues: vec![
                issue("a.sol", 0, "lint/a", Severity::Info),
                issue("a.sol", 1, "lint/b", Severity::Warning),
                issue("a.sol", 2, "lint/c", Severity::Error),
            ],
            partial: false,
        });
        report.finish();

        assert_eq!(
            report.counts(),
            SeverityCounts {
                errors: 1,
                warnings: 1,
                infos: 1
            }
        );
        assert_eq!(report.max_severity(), Some(Severity::Error));
        assert_eq!(report.issues_at_least(Severity::Warning).count(), 2);
        assert!(!report.partial);
    }
}
