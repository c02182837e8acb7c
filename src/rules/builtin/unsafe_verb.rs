use crate::document::{Method, OperationRef};
use crate::rules::{Category, Detector, RuleMetadata};

/// Operation-id fragments that signal a state-changing intent.
const MUTATING_INTENTS: &[&str] = &["create", "delete"];

/// GUARD-004: GET used for create/delete
///
/// Flags `GET` operations whose `operationId` contains `create` or `delete`
/// (case-insensitive substring, so `recreateCache` matches too).
pub struct UnsafeVerbDetector;

impl Detector for UnsafeVerbDetector {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "GUARD-004".into(),
            category: Category::UnsafeVerbForIntent,
            name: "GET used for create/delete".into(),
            description: "Safe HTTP verb used for a state-changing operation".into(),
            cwe_id: Some("CWE-650".into()),
        }
    }

    fn check_operation(&self, op: &OperationRef<'_>) -> Vec<String> {
        if op.method != Method::Get {
            return Vec::new();
        }
        let Some(id) = op.operation.operation_id.as_deref().filter(|id| !id.is_empty()) else {
            return Vec::new();
        };

        let lower = id.to_lowercase();
        if MUTATING_INTENTS.iter().any(|intent| lower.contains(intent)) {
            vec![format!("{} {} (operationId: {})", op.method, op.path, id)]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Operation;

    fn check(method: Method, operation_id: Option<&str>) -> Vec<String> {
        let operation = Operation {
            operation_id: operation_id.map(String::from),
            ..Default::default()
        };
        UnsafeVerbDetector.check_operation(&OperationRef {
            path: "/users",
            method,
            operation: &operation,
        })
    }

    #[test]
    fn flags_get_with_create_or_delete_id() {
        assert_eq!(
            check(Method::Get, Some("createUser")),
            vec!["GET /users (operationId: createUser)".to_string()]
        );
        assert_eq!(check(Method::Get, Some("DeleteUser")).len(), 1);
    }

    #[test]
    fn substring_match_is_not_word_bounded() {
        assert_eq!(check(Method::Get, Some("recreateIndex")).len(), 1);
        assert_eq!(check(Method::Get, Some("undeleteItem")).len(), 1);
    }

    #[test]
    fn passes_non_get_and_neutral_ids() {
        assert!(check(Method::Post, Some("createUser")).is_empty());
        assert!(check(Method::Get, Some("listUsers")).is_empty());
        assert!(check(Method::Get, Some("")).is_empty());
        assert!(check(Method::Get, None).is_empty());
    }
}
