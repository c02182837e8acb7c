//! Read-only model of an API description.
//!
//! The loader produces a `Document`. All detectors consume a `Document`.
//! This keeps OpenAPI/Swagger dialect differences out of the rules.

pub mod loader;
pub mod path_guard;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use loader::{load_document, parse_document};

/// A parsed API description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Declared servers, in document order.
    pub servers: Vec<Server>,
    /// Path template → path item. Sorted so traversal is reproducible.
    pub paths: BTreeMap<String, PathItem>,
}

impl Document {
    /// Iterate every (path, method, operation) triple in traversal order.
    pub fn operations(&self) -> impl Iterator<Item = OperationRef<'_>> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations
                .iter()
                .map(move |(method, operation)| OperationRef {
                    path: path.as_str(),
                    method: *method,
                    operation,
                })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    pub operations: BTreeMap<Method, Operation>,
}

/// One HTTP-method handler declared for a path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// `None` means the operation inherits the global requirement.
    /// `Some(vec![])` means it explicitly requires nothing.
    pub security: Option<Vec<SecurityRequirement>>,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
}

/// Scheme name → required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub schema: Option<serde_json::Value>,
}

/// Borrowed view of one operation together with where it lives.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: Method,
    pub operation: &'a Operation,
}

/// HTTP methods an OpenAPI path item can declare.
///
/// Variant order is the traversal order within a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
    Connect,
}

impl Method {
    /// Map a path-item key to a method. Non-method keys (`parameters`,
    /// `summary`, `$ref`, extensions) yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            "connect" => Some(Self::Connect),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Put => write!(f, "PUT"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
            Self::Options => write!(f, "OPTIONS"),
            Self::Head => write!(f, "HEAD"),
            Self::Patch => write!(f, "PATCH"),
            Self::Trace => write!(f, "TRACE"),
            Self::Connect => write!(f, "CONNECT"),
        }
    }
}

/// Where a parameter travels in the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    /// Swagger 2 only.
    Body,
    /// Swagger 2 only.
    FormData,
    Other(String),
}

impl ParameterLocation {
    pub fn from_str_lenient(s: &str) -> Self {
        match s {
            "query" => Self::Query,
            "header" => Self::Header,
            "path" => Self::Path,
            "cookie" => Self::Cookie,
            "body" => Self::Body,
            "formData" => Self::FormData,
            other => Self::Other(other.to_string()),
        }
    }
}
