//! Declarative test specifications
//!
//! A `TestSpec` describes one HTTP test case: the request to issue and the
//! expectations to check against the response. Specs are plain data built by
//! the fixture suites and validated before execution so a malformed case
//! fails as a programmer error, not at request time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CheckError, CheckResult};
use crate::matcher::Expected;

/// HTTP methods the target API understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }

    /// Only POST/PUT/PATCH carry a request body in this API
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Request serialization and response parsing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
    Xml,
}

/// Request payload: structured JSON or a verbatim string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestBody {
    Json(Value),
    Raw(String),
}

/// The three resource collections the API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Todo,
    Project,
    Category,
}

impl ResourceKind {
    /// Collection path segment, e.g. `todos` for `POST /todos`
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Todo => "todos",
            ResourceKind::Project => "projects",
            ResourceKind::Category => "categories",
        }
    }

    /// Key under which a setup-created id is recorded in the setup scope
    pub fn scope_key(&self) -> &'static str {
        match self {
            ResourceKind::Todo => "todo_id",
            ResourceKind::Project => "project_id",
            ResourceKind::Category => "category_id",
        }
    }
}

/// An object created before the request runs; its server-assigned id lands
/// in the setup scope under `<kind>_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupObject {
    pub kind: ResourceKind,
    pub payload: Value,
}

/// Where a placeholder substitution value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdSource {
    /// The id of a setup object of this kind
    Setup(ResourceKind),
    /// The case's `fallback_id` field
    Fallback,
    /// The value itself
    Literal(String),
}

fn default_fallback_id() -> String {
    "1".to_string()
}

fn default_true() -> bool {
    true
}

/// One declarative test case.
///
/// A placeholder token in `endpoint` with no entry in `id_replacements` is
/// deliberately left verbatim in the URL; several fixtures exercise
/// documented server defects that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub method: Method,

    /// Path template, may contain placeholder tokens like `{id}`
    pub endpoint: String,

    #[serde(default)]
    pub setup_objects: Vec<SetupObject>,

    /// Ordered placeholder -> source substitutions applied to `endpoint`
    #[serde(default)]
    pub id_replacements: Vec<(String, IdSource)>,

    /// Value used by `IdSource::Fallback`
    #[serde(default = "default_fallback_id")]
    pub fallback_id: String,

    #[serde(default)]
    pub request_body: Option<RequestBody>,

    #[serde(default)]
    pub encoding: Encoding,

    /// Non-empty set of acceptable status codes
    pub expected_status: Vec<u16>,

    #[serde(default)]
    pub expected_body: Option<Expected>,

    /// Header name -> value; `"*"` asserts presence only
    #[serde(default)]
    pub expected_headers: Option<BTreeMap<String, String>>,

    /// Check common headers and the HEAD-no-body rule
    #[serde(default)]
    pub validate_headers: bool,

    /// When false, an unparseable body is tolerated instead of failing
    #[serde(default = "default_true")]
    pub require_json_response: bool,
}

impl TestSpec {
    pub fn new(name: impl Into<String>, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            method,
            endpoint: endpoint.into(),
            setup_objects: Vec::new(),
            id_replacements: Vec::new(),
            fallback_id: default_fallback_id(),
            request_body: None,
            encoding: Encoding::Json,
            expected_status: vec![200],
            expected_body: None,
            expected_headers: None,
            validate_headers: false,
            require_json_response: true,
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn setup(mut self, kind: ResourceKind, payload: Value) -> Self {
        self.setup_objects.push(SetupObject { kind, payload });
        self
    }

    pub fn replace(mut self, placeholder: impl Into<String>, source: IdSource) -> Self {
        self.id_replacements.push((placeholder.into(), source));
        self
    }

    pub fn body(mut self, payload: Value) -> Self {
        self.request_body = Some(RequestBody::Json(payload));
        self
    }

    pub fn raw_body(mut self, text: impl Into<String>) -> Self {
        self.request_body = Some(RequestBody::Raw(text.into()));
        self
    }

    pub fn xml(mut self) -> Self {
        self.encoding = Encoding::Xml;
        self
    }

    pub fn expect_status(mut self, codes: &[u16]) -> Self {
        self.expected_status = codes.to_vec();
        self
    }

    pub fn expect_body(mut self, template: Value) -> Self {
        self.expected_body = Some(Expected::from(template));
        self
    }

    pub fn expect_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected_headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn check_headers(mut self) -> Self {
        self.validate_headers = true;
        self
    }

    pub fn tolerate_non_json(mut self) -> Self {
        self.require_json_response = false;
        self
    }

    /// Reject malformed specs before any request is issued.
    pub fn validate(&self) -> CheckResult<()> {
        if self.expected_status.is_empty() {
            return self.invalid("expected_status must not be empty");
        }
        if self.request_body.is_some() && !self.method.allows_body() {
            return self.invalid(format!("{} requests must not carry a body", self.method));
        }
        for (placeholder, source) in &self.id_replacements {
            if !self.endpoint.contains(placeholder.as_str()) {
                return self.invalid(format!(
                    "placeholder '{placeholder}' does not occur in endpoint '{}'",
                    self.endpoint
                ));
            }
            if let IdSource::Setup(kind) = source {
                if !self.setup_objects.iter().any(|s| s.kind == *kind) {
                    return self.invalid(format!(
                        "replacement '{placeholder}' references a {} setup object that is never created",
                        kind.collection()
                    ));
                }
            }
        }
        if self.encoding == Encoding::Xml {
            if let Some(RequestBody::Json(payload)) = &self.request_body {
                let Value::Object(fields) = payload else {
                    return self.invalid("XML-encoded bodies must be flat mappings");
                };
                if fields.values().any(|v| v.is_object() || v.is_array()) {
                    return self.invalid("the flat XML encoder does not support nested structures");
                }
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> CheckResult<()> {
        Err(CheckError::InvalidSpec {
            name: self.name.clone(),
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_spec_is_valid() {
        let spec = TestSpec::new("get_all_todos", Method::Get, "/todos");
        assert!(spec.validate().is_ok());
        assert_eq!(spec.expected_status, vec![200]);
        assert!(spec.require_json_response);
    }

    #[test]
    fn rejects_empty_status_set() {
        let spec = TestSpec::new("bad", Method::Get, "/todos").expect_status(&[]);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("expected_status"));
    }

    #[test]
    fn rejects_body_on_delete() {
        let spec = TestSpec::new("bad", Method::Delete, "/todos/1").body(json!({"id": "1"}));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("DELETE"));
    }

    #[test]
    fn rejects_placeholder_absent_from_endpoint() {
        let spec = TestSpec::new("bad", Method::Get, "/todos/1")
            .replace("{id}", IdSource::Literal("1".to_string()));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn rejects_setup_reference_without_setup_object() {
        let spec = TestSpec::new("bad", Method::Get, "/projects/{id}")
            .replace("{id}", IdSource::Setup(ResourceKind::Project));
        assert!(spec.validate().is_err());

        let spec = TestSpec::new("good", Method::Get, "/projects/{id}")
            .setup(ResourceKind::Project, json!({"title": "p"}))
            .replace("{id}", IdSource::Setup(ResourceKind::Project));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn rejects_nested_xml_body() {
        let spec = TestSpec::new("bad", Method::Post, "/todos")
            .xml()
            .body(json!({"title": "t", "tags": ["a"]}));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("flat XML encoder"));

        let spec = TestSpec::new("good", Method::Post, "/todos")
            .xml()
            .body(json!({"title": "t", "doneStatus": false}));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn raw_xml_bodies_bypass_the_flatness_check() {
        let spec = TestSpec::new("raw", Method::Post, "/todos")
            .xml()
            .raw_body("<todo><title>t</title></todo>");
        assert!(spec.validate().is_ok());
    }
}
