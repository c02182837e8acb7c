use crate::document::{Method, OperationRef};
use crate::rules::{Category, Detector, RuleMetadata};

/// GUARD-002: Insecure HTTP Methods
///
/// Flags `TRACE` and `OPTIONS` handlers, which leak request data or expose
/// the method surface of an endpoint.
pub struct InsecureMethodsDetector;

impl Detector for InsecureMethodsDetector {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "GUARD-002".into(),
            category: Category::InsecureHttpMethods,
            name: "Insecure HTTP Methods".into(),
            description: "TRACE or OPTIONS handler exposed".into(),
            cwe_id: Some("CWE-749".into()),
        }
    }

    fn check_operation(&self, op: &OperationRef<'_>) -> Vec<String> {
        match op.method {
            Method::Trace | Method::Options => vec![format!("{} {}", op.method, op.path)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Operation;

    fn check(method: Method) -> Vec<String> {
        let operation = Operation::default();
        InsecureMethodsDetector.check_operation(&OperationRef {
            path: "/echo",
            method,
            operation: &operation,
        })
    }

    #[test]
    fn flags_trace_and_options() {
        assert_eq!(check(Method::Trace), vec!["TRACE /echo".to_string()]);
        assert_eq!(check(Method::Options), vec!["OPTIONS /echo".to_string()]);
    }

    #[test]
    fn passes_other_methods() {
        for method in [Method::Get, Method::Post, Method::Head, Method::Connect] {
            assert!(check(method).is_empty(), "{method}");
        }
    }
}
