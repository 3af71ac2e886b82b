use serde::{Deserialize, Serialize};

/// One entry of the route manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDef {
    /// `GET`, `POST`, `PUT`, `DELETE`, `PATCH` or `ANY` (case-insensitive)
    pub method: String,
    pub path: String,
    /// `Controller@method`
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
}

impl RouteDef {
    pub fn new(method: &str, path: &str, action: &str) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            action: action.to_string(),
            middleware: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_middleware(mut self, spec: &str) -> Self {
        self.middleware.push(spec.to_string());
        self
    }
}
