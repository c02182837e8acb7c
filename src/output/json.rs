use serde::Serialize;

use crate::error::Result;
use crate::rules::{Assessment, Category, Severity, SeverityCounts};

#[derive(Serialize)]
struct JsonReport<'a> {
    issues: Vec<JsonIssue<'a>>,
    summary: SeverityCounts,
}

#[derive(Serialize)]
struct JsonIssue<'a> {
    category: Category,
    severity: Severity,
    evidence: &'a str,
}

/// Render an assessment as a JSON report: a flat `issues` list plus a
/// `summary` whose three keys are always present.
pub fn render(assessment: &Assessment) -> Result<String> {
    let issues = assessment
        .groups()
        .iter()
        .flat_map(|group| {
            group.evidence.iter().map(move |item| JsonIssue {
                category: group.category,
                severity: group.severity,
                evidence: item,
            })
        })
        .collect();

    let report = JsonReport {
        issues,
        summary: assessment.counts(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{aggregate, Findings, SeverityCatalogue};
    use serde_json::{json, Value};

    #[test]
    fn empty_report_keeps_summary_keys() {
        let assessment = aggregate(&Findings::new(), &SeverityCatalogue::builtin()).unwrap();
        let value: Value = serde_json::from_str(&render(&assessment).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "issues": [], "summary": { "high": 0, "medium": 0, "low": 0 } })
        );
    }

    #[test]
    fn issues_are_flattened_with_severity() {
        let mut findings = Findings::new();
        findings.push(Category::NoHttps, "http://insecure.example");
        findings.push(Category::UnsafeVerbForIntent, "GET /a (operationId: deleteA)");
        let assessment = aggregate(&findings, &SeverityCatalogue::builtin()).unwrap();

        let value: Value = serde_json::from_str(&render(&assessment).unwrap()).unwrap();
        assert_eq!(
            value["issues"],
            json!([
                { "category": "NoHTTPS", "severity": "high", "evidence": "http://insecure.example" },
                { "category": "UnsafeVerbForIntent", "severity": "medium", "evidence": "GET /a (operationId: deleteA)" }
            ])
        );
        assert_eq!(value["summary"]["high"], 1);
        assert_eq!(value["summary"]["medium"], 1);
    }
}
