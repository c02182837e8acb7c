//! swagger-guard: a security linter for OpenAPI/Swagger documents.
//!
//! Walks a parsed API description, applies a fixed set of OWASP-style
//! design heuristics, and reports findings by severity. Any high-severity
//! finding makes the run blocking (exit code 1), which is what CI gates on.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use swaggerguard::{assess, document};
//!
//! let doc = document::load_document(Path::new("openapi.yaml")).unwrap();
//! let assessment = assess(&doc).unwrap();
//! println!("Blocking: {}, High: {}", assessment.is_blocking(), assessment.counts().high);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod metrics;
pub mod output;
pub mod rules;
pub mod runner;

use document::Document;
use error::Result;
use rules::{aggregate, Assessment, RuleEngine, SeverityCatalogue};

pub use output::OutputFormat;
pub use runner::{run, Orchestrator, RunOptions, RunOutcome, RunState};

/// Evaluate every built-in rule against a document and aggregate the result.
pub fn assess(document: &Document) -> Result<Assessment> {
    let findings = RuleEngine::new().evaluate(document);
    aggregate(&findings, &SeverityCatalogue::builtin())
}
