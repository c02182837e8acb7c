pub mod aggregate;
pub mod builtin;
pub mod catalogue;
pub mod finding;

use crate::document::{Document, OperationRef, Server};

pub use aggregate::{aggregate, Assessment, FindingGroup, SeverityCounts};
pub use catalogue::SeverityCatalogue;
pub use finding::{Category, Finding, Findings, RuleMetadata, Severity};

/// A detector inspects one operation or one server and returns evidence
/// strings for its category.
pub trait Detector: Send + Sync {
    /// Metadata about this rule (id, category, name, CWE).
    fn metadata(&self) -> RuleMetadata;

    /// Evidence produced for a single operation.
    fn check_operation(&self, _op: &OperationRef<'_>) -> Vec<String> {
        Vec::new()
    }

    /// Evidence produced for a single declared server.
    fn check_server(&self, _server: &Server) -> Option<String> {
        None
    }
}

/// The rule engine runs all registered detectors over a document in a
/// single traversal.
pub struct RuleEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl RuleEngine {
    /// Create a new engine with all built-in detectors registered.
    pub fn new() -> Self {
        Self {
            detectors: builtin::all_detectors(),
        }
    }

    /// Apply every detector to every operation, then to every server.
    pub fn evaluate(&self, document: &Document) -> Findings {
        let categories: Vec<Category> = self
            .detectors
            .iter()
            .map(|d| d.metadata().category)
            .collect();
        let mut findings = Findings::new();

        for op in document.operations() {
            for (detector, category) in self.detectors.iter().zip(&categories) {
                for evidence in detector.check_operation(&op) {
                    findings.push(*category, evidence);
                }
            }
        }

        for server in &document.servers {
            for (detector, category) in self.detectors.iter().zip(&categories) {
                if let Some(evidence) = detector.check_server(server) {
                    findings.push(*category, evidence);
                }
            }
        }

        tracing::debug!(
            categories = findings.category_count(),
            total = findings.total(),
            "rules evaluated"
        );
        findings
    }

    /// List metadata for all registered rules.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.detectors.iter().map(|d| d.metadata()).collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Method, Operation, Parameter, ParameterLocation, PathItem};

    fn doc_with(path: &str, method: Method, operation: Operation) -> Document {
        let mut item = PathItem::default();
        item.operations.insert(method, operation);
        let mut doc = Document::default();
        doc.paths.insert(path.into(), item);
        doc
    }

    #[test]
    fn empty_document_has_no_findings() {
        let findings = RuleEngine::new().evaluate(&Document::default());
        assert!(findings.is_empty());
    }

    #[test]
    fn one_operation_can_hit_several_categories() {
        let doc = doc_with(
            "/debug",
            Method::Options,
            Operation {
                security: Some(vec![]),
                operation_id: None,
                parameters: vec![Parameter {
                    name: "verbose".into(),
                    location: ParameterLocation::Query,
                    schema: None,
                }],
            },
        );
        let findings = RuleEngine::new().evaluate(&doc);
        assert_eq!(
            findings.get(Category::NoAuthentication).unwrap(),
            &["OPTIONS /debug".to_string()]
        );
        assert_eq!(
            findings.get(Category::InsecureHttpMethods).unwrap(),
            &["OPTIONS /debug".to_string()]
        );
        assert_eq!(
            findings.get(Category::UntypedQueryParameter).unwrap(),
            &["OPTIONS /debug param: verbose".to_string()]
        );
        assert!(!findings.contains(Category::UnsafeVerbForIntent));
        assert!(!findings.contains(Category::NoHttps));
    }

    #[test]
    fn servers_are_checked_after_operations() {
        let mut doc = doc_with("/a", Method::Get, Operation::default());
        doc.servers.push(Server {
            url: "http://insecure.example".into(),
        });
        doc.servers.push(Server {
            url: "https://secure.example".into(),
        });
        doc.servers.push(Server { url: String::new() });

        let findings = RuleEngine::new().evaluate(&doc);
        assert_eq!(
            findings.get(Category::NoHttps).unwrap(),
            &["http://insecure.example".to_string()]
        );
        assert_eq!(findings.total(), 1);
    }

    #[test]
    fn every_builtin_rule_has_a_severity() {
        let catalogue = SeverityCatalogue::builtin();
        for rule in RuleEngine::new().list_rules() {
            assert!(catalogue.severity_of(rule.category).is_ok(), "{}", rule.id);
        }
    }
}
