use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{json, Value};

use super::{
    Document, Method, Operation, Parameter, ParameterLocation, PathItem, SecurityRequirement,
    Server,
};
use crate::error::{GuardError, Result};

/// Which flavour of API description a file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    OpenApi3,
    Swagger2,
}

impl Dialect {
    fn detect(root: &Value) -> Option<Self> {
        if root.get("openapi").is_some() {
            Some(Self::OpenApi3)
        } else if root.get("swagger").is_some() {
            Some(Self::Swagger2)
        } else {
            None
        }
    }
}

/// Read and parse an OpenAPI 3 or Swagger 2 document (YAML or JSON).
pub fn load_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)
        .map_err(|e| GuardError::Input(format!("cannot read {}: {}", path.display(), e)))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| parse_error(path, &format!("not valid UTF-8: {}", e)))?;
    parse_document(&content, path)
}

/// Parse document text. `origin` is only used in error messages and to pick
/// the JSON parser for `.json` files. Everything else goes through the YAML
/// parser, which also reads JSON and flow-style YAML.
pub fn parse_document(content: &str, origin: &Path) -> Result<Document> {
    let root = parse_value(content, origin)?;
    if !root.is_object() {
        return Err(parse_error(origin, "top level is not a mapping"));
    }

    let dialect = Dialect::detect(&root).ok_or_else(|| {
        parse_error(
            origin,
            "neither an `openapi` nor a `swagger` version field is declared",
        )
    })?;

    let servers = match dialect {
        Dialect::OpenApi3 => parse_servers(&root, origin)?,
        Dialect::Swagger2 => synthesize_servers(&root),
    };

    let mut paths = BTreeMap::new();
    if let Some(paths_value) = root.get("paths").filter(|v| !v.is_null()) {
        let entries = paths_value
            .as_object()
            .ok_or_else(|| parse_error(origin, "`paths` is not a mapping"))?;
        for (path, item) in entries {
            let item = parse_path_item(&root, dialect, path, item, origin)?;
            paths.insert(path.clone(), item);
        }
    }

    tracing::debug!(
        file = %origin.display(),
        dialect = ?dialect,
        paths = paths.len(),
        servers = servers.len(),
        "document loaded"
    );

    Ok(Document {
        servers,
        paths,
    })
}

fn parse_value(content: &str, origin: &Path) -> Result<Value> {
    let is_json = origin
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| parse_error(origin, &e.to_string()))
    } else {
        serde_yaml::from_str(content).map_err(|e| parse_error(origin, &e.to_string()))
    }
}

fn parse_servers(root: &Value, origin: &Path) -> Result<Vec<Server>> {
    let Some(servers) = root.get("servers").filter(|v| !v.is_null()) else {
        return Ok(Vec::new());
    };
    let servers = servers
        .as_array()
        .ok_or_else(|| parse_error(origin, "`servers` is not a list"))?;

    Ok(servers
        .iter()
        .map(|server| Server {
            url: server
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        })
        .collect())
}

/// Swagger 2 has no `servers`; build one URL per declared scheme.
/// Without explicit `schemes` the transport is unknown and nothing is emitted.
fn synthesize_servers(root: &Value) -> Vec<Server> {
    let Some(host) = root.get("host").and_then(|v| v.as_str()) else {
        return Vec::new();
    };
    let base_path = root
        .get("basePath")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    root.get("schemes")
        .and_then(|v| v.as_array())
        .map(|schemes| {
            schemes
                .iter()
                .filter_map(|s| s.as_str())
                .map(|scheme| Server {
                    url: format!("{}://{}{}", scheme, host, base_path),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_path_item(
    root: &Value,
    dialect: Dialect,
    path: &str,
    item: &Value,
    origin: &Path,
) -> Result<PathItem> {
    let entries = item
        .as_object()
        .ok_or_else(|| parse_error(origin, &format!("path item `{}` is not a mapping", path)))?;

    let mut operations = BTreeMap::new();
    for (key, value) in entries {
        let Some(method) = Method::from_key(key) else {
            continue;
        };
        let operation = parse_operation(root, dialect, path, method, value, origin)?;
        operations.insert(method, operation);
    }

    Ok(PathItem { operations })
}

fn parse_operation(
    root: &Value,
    dialect: Dialect,
    path: &str,
    method: Method,
    value: &Value,
    origin: &Path,
) -> Result<Operation> {
    let context = format!("{} {}", method, path);
    let op = value
        .as_object()
        .ok_or_else(|| parse_error(origin, &format!("operation `{}` is not a mapping", context)))?;

    let security = match op.get("security") {
        None | Some(Value::Null) => None,
        Some(Value::Array(requirements)) => Some(
            requirements
                .iter()
                .map(|req| parse_security_requirement(req, &context, origin))
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => {
            return Err(parse_error(
                origin,
                &format!("`security` of `{}` is not a list", context),
            ))
        }
    };

    let operation_id = op
        .get("operationId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let mut parameters = Vec::new();
    if let Some(params) = op.get("parameters").filter(|v| !v.is_null()) {
        let params = params.as_array().ok_or_else(|| {
            parse_error(
                origin,
                &format!("`parameters` of `{}` is not a list", context),
            )
        })?;
        for param in params {
            let param = resolve_ref(root, param, origin)?;
            parameters.push(parse_parameter(dialect, param));
        }
    }

    Ok(Operation {
        security,
        operation_id,
        parameters,
    })
}

fn parse_security_requirement(
    value: &Value,
    context: &str,
    origin: &Path,
) -> Result<SecurityRequirement> {
    let schemes = value.as_object().ok_or_else(|| {
        parse_error(
            origin,
            &format!("security requirement of `{}` is not a mapping", context),
        )
    })?;

    Ok(schemes
        .iter()
        .map(|(name, scopes)| {
            let scopes = scopes
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|s| s.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            (name.clone(), scopes)
        })
        .collect())
}

fn parse_parameter(dialect: Dialect, param: &Value) -> Parameter {
    let name = param
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let location = ParameterLocation::from_str_lenient(
        param.get("in").and_then(|v| v.as_str()).unwrap_or_default(),
    );

    let schema = match param.get("schema") {
        Some(schema) if !schema.is_null() => Some(schema.clone()),
        // Swagger 2 non-body parameters carry their type inline.
        _ if dialect == Dialect::Swagger2 => param.get("type").map(|ty| {
            let mut schema = json!({ "type": ty });
            for key in ["format", "items", "enum"] {
                if let Some(v) = param.get(key) {
                    schema[key] = v.clone();
                }
            }
            schema
        }),
        _ => None,
    };

    Parameter {
        name,
        location,
        schema,
    }
}

/// Follow a local `$ref` (`#/components/parameters/...` or `#/parameters/...`).
fn resolve_ref<'a>(root: &'a Value, value: &'a Value, origin: &Path) -> Result<&'a Value> {
    let Some(reference) = value.get("$ref").and_then(|v| v.as_str()) else {
        return Ok(value);
    };
    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        parse_error(
            origin,
            &format!("external reference `{}` is not supported", reference),
        )
    })?;
    root.pointer(pointer)
        .ok_or_else(|| parse_error(origin, &format!("unresolved reference `{}`", reference)))
}

fn parse_error(origin: &Path, message: &str) -> GuardError {
    GuardError::Parse {
        file: origin.display().to_string(),
        message: message.to_string(),
    }
}
