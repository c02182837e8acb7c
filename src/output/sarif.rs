use serde_json::{json, Value};

use crate::error::Result;
use crate::rules::{Assessment, RuleEngine, Severity, SeverityCatalogue};

/// Render an assessment as SARIF 2.1.0.
///
/// Findings have no line information, so results carry a logical location
/// (the evidence string) instead of a physical one.
pub fn render(assessment: &Assessment) -> Result<String> {
    let catalogue = SeverityCatalogue::builtin();
    let rule_list = RuleEngine::new().list_rules();

    let mut rules = Vec::with_capacity(rule_list.len());
    for rule in &rule_list {
        let severity = catalogue.severity_of(rule.category)?;
        let mut value = json!({
            "id": rule.id,
            "name": rule.category.tag(),
            "shortDescription": { "text": rule.name },
            "fullDescription": { "text": rule.description },
            "defaultConfiguration": {
                "level": severity_to_sarif_level(severity),
            },
        });
        if let Some(cwe) = &rule.cwe_id {
            value["properties"] = json!({ "tags": ["security", cwe] });
        }
        rules.push(value);
    }

    let results: Vec<Value> = assessment
        .groups()
        .iter()
        .flat_map(|group| {
            let rule_id = rule_list
                .iter()
                .find(|r| r.category == group.category)
                .map(|r| r.id.clone())
                .unwrap_or_else(|| group.category.tag().to_string());
            group.evidence.iter().map(move |item| {
                json!({
                    "ruleId": rule_id,
                    "level": severity_to_sarif_level(group.severity),
                    "message": { "text": format!("{}: {}", group.category, item) },
                    "locations": [{
                        "logicalLocations": [{ "fullyQualifiedName": item }],
                    }],
                })
            })
        })
        .collect();

    let sarif = json!({
        "$schema": "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "swagger-guard",
                    "version": env!("CARGO_PKG_VERSION"),
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules,
                },
            },
            "results": results,
        }],
    });

    let output = serde_json::to_string_pretty(&sarif)?;
    Ok(output)
}

fn severity_to_sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}
