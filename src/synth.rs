//! Operation + bound values → request descriptor
//!
//! Substitutes path placeholders, assembles the query string and headers, and
//! attaches the body text verbatim. Nothing here touches the network.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use url::form_urlencoded;

use crate::binder::ParameterBinder;
use crate::error::SynthesisError;
use crate::index::{HttpMethod, Operation, ParameterLocation};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A fully resolved, ready-to-send HTTP call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,
    /// Header name/value pairs in the order they are sent
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestDescriptor {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Reject unbound path parameters instead of substituting `""`.
    pub strict: bool,
}

/// Builds request descriptors against one base URL.
#[derive(Debug, Clone)]
pub struct RequestSynthesizer {
    base_url: String,
    options: SynthesisOptions,
}

impl RequestSynthesizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            options: SynthesisOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SynthesisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn synthesize(
        &self,
        op: &Operation,
        binder: &ParameterBinder,
        body_text: &str,
    ) -> Result<RequestDescriptor, SynthesisError> {
        let path = substitute_path(op, binder, self.options)?;
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        let query = build_query(op, binder);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let body = (op.accepts_body() && !body_text.is_empty()).then(|| body_text.to_string());

        let descriptor = RequestDescriptor {
            url,
            method: op.method,
            headers: build_headers(op, binder),
            body,
        };
        debug!(request = %descriptor, has_body = descriptor.body.is_some(), "synthesized request");
        Ok(descriptor)
    }
}

/// Permissive one-shot synthesis: unbound path parameters become `""`.
pub fn synthesize(
    base_url: &str,
    op: &Operation,
    binder: &ParameterBinder,
    body_text: &str,
) -> Result<RequestDescriptor, SynthesisError> {
    RequestSynthesizer::new(base_url).synthesize(op, binder, body_text)
}

fn substitute_path(
    op: &Operation,
    binder: &ParameterBinder,
    options: SynthesisOptions,
) -> Result<String, SynthesisError> {
    let mut path = op.path.clone();
    for param in op.parameters_in(ParameterLocation::Path) {
        let value = binder.get(&param.name);
        if value.is_empty() && options.strict {
            return Err(SynthesisError::MissingRequiredParameter {
                name: param.name.clone(),
            });
        }
        path = path.replacen(
            &format!("{{{}}}", param.name),
            &urlencoding::encode(value),
            1,
        );
    }
    Ok(path)
}

/// Non-empty query values in declaration order, form-encoded.
fn build_query(op: &Operation, binder: &ParameterBinder) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for param in op.parameters_in(ParameterLocation::Query) {
        let value = binder.get(&param.name);
        if !value.is_empty() {
            serializer.append_pair(&param.name, value);
        }
    }
    serializer.finish()
}

fn build_headers(op: &Operation, binder: &ParameterBinder) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())];

    for param in op.parameters_in(ParameterLocation::Header) {
        let value = binder.get(&param.name);
        if value.is_empty() {
            continue;
        }
        if param.name.eq_ignore_ascii_case("content-type") {
            debug!(param = %param.name, "content type is fixed, skipping header parameter");
            continue;
        }
        match headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&param.name))
        {
            Some(existing) => existing.1 = value.to_string(),
            None => headers.push((param.name.clone(), value.to_string())),
        }
    }

    let cookies: Vec<String> = op
        .parameters_in(ParameterLocation::Cookie)
        .filter_map(|param| {
            let value = binder.get(&param.name);
            (!value.is_empty()).then(|| format!("{}={}", param.name, value))
        })
        .collect();
    if !cookies.is_empty() {
        headers.push(("Cookie".to_string(), cookies.join("; ")));
    }

    headers
}
