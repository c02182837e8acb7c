use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of weakness a detector reports.
///
/// Variant order is the order categories appear in every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    NoAuthentication,
    #[serde(rename = "InsecureHTTPMethods")]
    InsecureHttpMethods,
    #[serde(rename = "NoHTTPS")]
    NoHttps,
    UnsafeVerbForIntent,
    UntypedQueryParameter,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::NoAuthentication,
        Self::InsecureHttpMethods,
        Self::NoHttps,
        Self::UnsafeVerbForIntent,
        Self::UntypedQueryParameter,
    ];

    /// Stable machine tag, as used in JSON and SARIF output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NoAuthentication => "NoAuthentication",
            Self::InsecureHttpMethods => "InsecureHTTPMethods",
            Self::NoHttps => "NoHTTPS",
            Self::UnsafeVerbForIntent => "UnsafeVerbForIntent",
            Self::UntypedQueryParameter => "UntypedQueryParameter",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthentication => write!(f, "No Authentication"),
            Self::InsecureHttpMethods => write!(f, "Insecure HTTP Methods"),
            Self::NoHttps => write!(f, "No HTTPS"),
            Self::UnsafeVerbForIntent => write!(f, "GET used for create/delete"),
            Self::UntypedQueryParameter => write!(f, "Query parameter without type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One detected weakness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    /// Human-readable location, e.g. `GET /users` or a server URL.
    pub evidence: String,
}

/// Findings grouped by category. Categories without findings are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    by_category: BTreeMap<Category, Vec<String>>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, evidence: impl Into<String>) {
        self.by_category
            .entry(category)
            .or_default()
            .push(evidence.into());
    }

    pub fn get(&self, category: Category) -> Option<&[String]> {
        self.by_category.get(&category).map(|v| v.as_slice())
    }

    pub fn contains(&self, category: Category) -> bool {
        self.by_category.contains_key(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.by_category.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Number of categories with at least one finding.
    pub fn category_count(&self) -> usize {
        self.by_category.len()
    }

    /// Total number of evidence entries across all categories.
    pub fn total(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.is_empty()
    }
}

impl FromIterator<Finding> for Findings {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut findings = Self::new();
        for f in iter {
            findings.push(f.category, f.evidence);
        }
        findings
    }
}

/// Metadata about a detector rule, used for `list-rules` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub category: Category,
    pub name: String,
    pub description: String,
    pub cwe_id: Option<String>,
}
