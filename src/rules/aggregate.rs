use serde::{Deserialize, Serialize};

use super::{Category, Findings, Severity, SeverityCatalogue};
use crate::error::Result;

/// Number of findings per severity bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity, n: usize) {
        match severity {
            Severity::High => self.high += n,
            Severity::Medium => self.medium += n,
            Severity::Low => self.low += n,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// All evidence for one category, with its resolved severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingGroup {
    pub category: Category,
    pub severity: Severity,
    pub evidence: Vec<String>,
}

/// The result of a run: grouped findings, counts, and the blocking
/// disposition. Built once by [`aggregate`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    groups: Vec<FindingGroup>,
    counts: SeverityCounts,
    blocking: bool,
}

impl Assessment {
    pub fn groups(&self) -> &[FindingGroup] {
        &self.groups
    }

    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    /// True iff at least one high-severity finding exists.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, category: Category) -> Option<&FindingGroup> {
        self.groups.iter().find(|g| g.category == category)
    }
}

/// Resolve severities and count findings per bucket.
///
/// Fails with a configuration error if a present category has no catalogue
/// entry. The result does not depend on the iteration order of `findings`.
pub fn aggregate(findings: &Findings, catalogue: &SeverityCatalogue) -> Result<Assessment> {
    let mut counts = SeverityCounts::default();
    let mut groups = Vec::with_capacity(findings.category_count());

    for (category, evidence) in findings.iter() {
        let severity = catalogue.severity_of(category)?;
        counts.add(severity, evidence.len());
        groups.push(FindingGroup {
            category,
            severity,
            evidence: evidence.to_vec(),
        });
    }
    groups.sort_by_key(|g| g.category);

    let blocking = counts.high > 0;
    tracing::debug!(
        high = counts.high,
        medium = counts.medium,
        low = counts.low,
        blocking,
        "findings aggregated"
    );

    Ok(Assessment {
        groups,
        counts,
        blocking,
    })
}
