use crate::document::{OperationRef, ParameterLocation};
use crate::rules::{Category, Detector, RuleMetadata};

/// GUARD-005: Query parameter without type
///
/// Flags query parameters that carry no schema, leaving their accepted
/// values unconstrained.
pub struct UntypedQueryDetector;

impl Detector for UntypedQueryDetector {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "GUARD-005".into(),
            category: Category::UntypedQueryParameter,
            name: "Query parameter without type".into(),
            description: "Query parameter declared without a schema".into(),
            cwe_id: Some("CWE-20".into()),
        }
    }

    fn check_operation(&self, op: &OperationRef<'_>) -> Vec<String> {
        op.operation
            .parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Query && p.schema.is_none())
            .map(|p| format!("{} {} param: {}", op.method, op.path, p.name))
            .collect()
    }
}
