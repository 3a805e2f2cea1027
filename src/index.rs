//! OpenAPI description → category/operation index
//!
//! Walks an already-parsed OpenAPI document and produces a flat list of
//! `Operation`s plus a lookup of declared categories (tags) in document order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// HTTP verbs an OpenAPI path item may declare, in the order OpenAPI lists them.
const PATH_ITEM_VERBS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Only POST, PUT and PATCH carry a request body.
    pub fn accepts_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "put" => Ok(Self::Put),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            "options" => Ok(Self::Options),
            "head" => Ok(Self::Head),
            "patch" => Ok(Self::Patch),
            "trace" => Ok(Self::Trace),
            _ => Err(s.to_string()),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Options => reqwest::Method::OPTIONS,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Trace => reqwest::Method::TRACE,
        }
    }
}

/// Where a parameter value travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            _ => Err(s.to_string()),
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: String,
}

/// One (path, method) pair from the description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// URL path template (e.g. "/users/{id}")
    pub path: String,
    pub method: HttpMethod,
    /// First tag of the operation, if any
    pub category: Option<String>,
    pub operation_id: Option<String>,
    pub summary: String,
    pub description: String,
    /// Declared parameters, path-level first, in declaration order
    pub parameters: Vec<ParameterSpec>,
}

impl Operation {
    pub fn accepts_body(&self) -> bool {
        self.method.accepts_body()
    }

    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &ParameterSpec> + '_ {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// Categories and operations of one description, in document order.
#[derive(Debug, Clone, Default)]
pub struct DescriptionIndex {
    categories: Vec<String>,
    operations: Vec<Operation>,
}

impl DescriptionIndex {
    /// Build the index from a parsed description. Never fails: missing or
    /// malformed sections simply contribute nothing.
    pub fn build(description: &Value) -> Self {
        let categories = declared_categories(description);
        let operations = extract_operations(description);
        debug!(
            categories = categories.len(),
            operations = operations.len(),
            "indexed API description"
        );
        Self {
            categories,
            operations,
        }
    }

    /// Declared categories, in declared order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Every operation, categorised or not.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operations whose category is `category`. Empty for undeclared categories.
    pub fn operations_in<'a>(&'a self, category: &'a str) -> Vec<&'a Operation> {
        if !self.categories.iter().any(|c| c == category) {
            return Vec::new();
        }
        self.operations
            .iter()
            .filter(|op| op.category.as_deref() == Some(category))
            .collect()
    }

    /// Declared categories paired with their operations.
    pub fn grouped(&self) -> Vec<(&str, Vec<&Operation>)> {
        self.categories
            .iter()
            .map(|c| (c.as_str(), self.operations_in(c)))
            .collect()
    }

    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.method == method && op.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.operations.is_empty()
    }
}

fn declared_categories(description: &Value) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    let Some(tags) = description.get("tags").and_then(|t| t.as_array()) else {
        return categories;
    };
    for tag in tags {
        let Some(name) = tag.get("name").and_then(|n| n.as_str()) else {
            debug!(?tag, "skipping tag without a name");
            continue;
        };
        if !categories.iter().any(|c| c == name) {
            categories.push(name.to_string());
        }
    }
    categories
}

fn extract_operations(description: &Value) -> Vec<Operation> {
    let mut ops = Vec::new();

    let paths = match description.get("paths").and_then(|p| p.as_object()) {
        Some(p) => p,
        None => return ops,
    };

    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        let path_level_params = item.get("parameters");

        // Document order, not verb order: the index must not re-sort.
        for (key, operation) in item {
            if !PATH_ITEM_VERBS.contains(&key.as_str()) {
                continue;
            }
            let Ok(method) = key.parse::<HttpMethod>() else {
                continue;
            };
            ops.push(extract_single_operation(
                path,
                method,
                operation,
                path_level_params,
            ));
        }
    }

    ops
}

fn extract_single_operation(
    path: &str,
    method: HttpMethod,
    operation: &Value,
    path_level_params: Option<&Value>,
) -> Operation {
    let text = |key: &str| {
        operation
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    let category = operation
        .get("tags")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let operation_id = operation
        .get("operationId")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Operation {
        path: path.to_string(),
        method,
        category,
        operation_id,
        summary: text("summary"),
        description: text("description"),
        parameters: collect_params(path_level_params, operation.get("parameters")),
    }
}

/// Merge path-level + operation-level parameters.
/// Operation-level replaces path-level in place when (name, location) match.
fn collect_params(path_level: Option<&Value>, operation_level: Option<&Value>) -> Vec<ParameterSpec> {
    let mut params: Vec<ParameterSpec> = Vec::new();

    for source in [path_level, operation_level].iter().flatten() {
        let Some(list) = source.as_array() else {
            continue;
        };
        for raw in list {
            let Some(param) = parse_param(raw) else {
                debug!(param = %raw, "skipping unusable parameter");
                continue;
            };
            match params
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => params.push(param),
            }
        }
    }

    params
}

fn parse_param(param: &Value) -> Option<ParameterSpec> {
    let name = param.get("name")?.as_str()?.to_string();
    let location: ParameterLocation = param.get("in")?.as_str()?.parse().ok()?;
    let description = param
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let required = location == ParameterLocation::Path
        || param
            .get("required")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

    Some(ParameterSpec {
        name,
        location,
        required,
        description,
    })
}
