use std::collections::HashMap;

use http::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::ids::RequestId;

/// Form field carrying the spoofed HTTP method of a POST submission.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// An inbound request as seen by the dispatcher, middleware and controllers.
#[derive(Debug, Clone)]
pub struct Request {
    /// Correlation id, taken from the `x-request-id` header when valid
    pub request_id: RequestId,
    /// Actual HTTP method
    pub method: Method,
    /// Request target including the query string
    pub uri: String,
    /// Headers with lower-case names
    pub headers: HashMap<String, String>,
    /// Decoded query string
    pub query: HashMap<String, String>,
    /// Query parameters overlaid with the decoded body (form or JSON object)
    pub input: Map<String, Value>,
    /// Decoded body fields only
    pub form: Map<String, Value>,
}

impl Request {
    /// Build a request for `method` + `uri`, decoding the query string into the input map.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let query = parse_query_params(&uri);
        let input = query
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        Self {
            request_id: RequestId::new(),
            method,
            uri,
            headers: HashMap::new(),
            query,
            input,
            form: Map::new(),
        }
    }

    /// Assemble a request from raw wire parts.
    pub fn from_parts(
        method: &str,
        uri: &str,
        headers: HashMap<String, String>,
        body: &[u8],
    ) -> Result<Self, http::method::InvalidMethod> {
        let method = Method::from_bytes(method.as_bytes())?;
        let mut req = Self::new(method, uri);
        req.request_id = RequestId::from_headers(&headers);
        req.headers = headers;
        Ok(req.with_body(body))
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Overlay form fields onto the input map.
    #[must_use]
    pub fn with_form(mut self, fields: &[(&str, &str)]) -> Self {
        for (k, v) in fields {
            self.insert_body_field((*k).to_string(), Value::String((*v).to_string()));
        }
        self
    }

    /// Overlay the fields of a JSON object onto the input map; other JSON values are ignored.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        if let Value::Object(fields) = body {
            for (k, v) in fields {
                self.insert_body_field(k, v);
            }
        }
        self
    }

    fn insert_body_field(&mut self, key: String, value: Value) {
        self.form.insert(key.clone(), value.clone());
        self.input.insert(key, value);
    }

    /// Decode `body` according to the `content-type` header and overlay it onto the input.
    ///
    /// JSON content types are decoded as JSON; everything else as
    /// `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn with_body(self, body: &[u8]) -> Self {
        if body.is_empty() {
            return self;
        }
        if self.is_json() {
            match serde_json::from_slice::<Value>(body) {
                Ok(value) => self.with_json(value),
                Err(err) => {
                    debug!(error = %err, "Ignoring undecodable JSON body");
                    self
                }
            }
        } else {
            let mut req = self;
            for (k, v) in url::form_urlencoded::parse(body) {
                req.insert_body_field(k.into_owned(), Value::String(v.into_owned()));
            }
            req
        }
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or("/")
    }

    /// Path used for route matching: query stripped, leading/trailing `/` trimmed.
    #[must_use]
    pub fn route_path(&self) -> &str {
        self.path().trim_matches('/')
    }

    /// Header lookup by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or_default()
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type().starts_with("application/json")
    }

    #[must_use]
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.input.get(key)
    }

    /// Input value as a string slice, if it is a string.
    #[must_use]
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.input.contains_key(key)
    }

    /// Subset of the input restricted to `keys`.
    #[must_use]
    pub fn only(&self, keys: &[&str]) -> Map<String, Value> {
        keys.iter()
            .filter_map(|k| self.input.get(*k).map(|v| ((*k).to_string(), v.clone())))
            .collect()
    }

    /// The `_method` body field of a POST request, if present. A `_method` query parameter
    /// is ordinary input and never changes the method.
    #[must_use]
    pub fn override_method(&self) -> Option<&str> {
        if self.method == Method::POST {
            self.form.get(METHOD_OVERRIDE_FIELD).and_then(Value::as_str)
        } else {
            None
        }
    }

    /// Method used for route lookup: the upper-cased override for POST requests that carry
    /// one, otherwise the actual method. `None` when the override is not a valid method token.
    #[must_use]
    pub fn effective_method(&self) -> Option<Method> {
        match self.override_method() {
            Some(spoofed) => Method::from_bytes(spoofed.trim().to_ascii_uppercase().as_bytes()).ok(),
            None => Some(self.method.clone()),
        }
    }
}

/// Parse query string parameters from a request target.
///
/// Extracts everything after the `?` character and URL-decodes names and values.
#[must_use]
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    match uri.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => HashMap::new(),
    }
}
