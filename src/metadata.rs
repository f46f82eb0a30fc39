//! Description of a single request exchange.

use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query parameters for a request, encoded in key order.
pub type QueryParams = BTreeMap<String, String>;

/// Everything needed to issue one API request.
///
/// The path is relative to the API origin; a leading `/` is added when
/// missing. An empty body is never sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: Method,

    /// The request path, e.g. `meetings` or `/webhooks/1`.
    pub path: String,

    /// Query parameters, URL-form-encoded onto the URL when non-empty.
    pub query_params: QueryParams,

    /// The JSON body.
    pub body: Option<Value>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: QueryParams::new(),
            body: None,
        }
    }

    /// Adds a query parameter, replacing any earlier value for the key.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the path with a guaranteed leading `/`.
    pub fn normalized_path(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }

    /// Returns the body to send, or `None` when the logical body is empty
    /// (absent, `null`, `{}` or `[]`).
    pub fn body_to_send(&self) -> Option<&Value> {
        match &self.body {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(body) => Some(body),
        }
    }
}
