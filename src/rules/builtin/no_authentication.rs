use crate::document::OperationRef;
use crate::rules::{Category, Detector, RuleMetadata};

/// GUARD-001: No Authentication
///
/// Flags operations that declare `security: []`. An absent `security` key
/// inherits the document-level requirement and is not flagged.
pub struct NoAuthenticationDetector;

impl Detector for NoAuthenticationDetector {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "GUARD-001".into(),
            category: Category::NoAuthentication,
            name: "No Authentication".into(),
            description: "Operation explicitly requires no security scheme".into(),
            cwe_id: Some("CWE-306".into()),
        }
    }

    fn check_operation(&self, op: &OperationRef<'_>) -> Vec<String> {
        match &op.operation.security {
            Some(requirements) if requirements.is_empty() => {
                vec![format!("{} {}", op.method, op.path)]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Method, Operation};
    use std::collections::BTreeMap;

    fn check(security: Option<Vec<BTreeMap<String, Vec<String>>>>) -> Vec<String> {
        let operation = Operation {
            security,
            ..Default::default()
        };
        NoAuthenticationDetector.check_operation(&OperationRef {
            path: "/users",
            method: Method::Get,
            operation: &operation,
        })
    }

    #[test]
    fn flags_explicitly_empty_security() {
        assert_eq!(check(Some(vec![])), vec!["GET /users".to_string()]);
    }

    #[test]
    fn passes_absent_security() {
        assert!(check(None).is_empty());
    }

    #[test]
    fn passes_declared_scheme() {
        let mut req = BTreeMap::new();
        req.insert("bearerAuth".to_string(), vec![]);
        assert!(check(Some(vec![req])).is_empty());
    }

    #[test]
    fn passes_optional_auth_alternative() {
        // `security: [{}]` lists one (empty) alternative, not an empty list.
        assert!(check(Some(vec![BTreeMap::new()])).is_empty());
    }
}
