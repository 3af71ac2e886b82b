use serde_json::Value;

/// Content type of a [`Response`] body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Json,
    Text,
}

impl ContentType {
    /// Full header line, as written on the wire.
    #[must_use]
    pub fn header_line(self) -> &'static str {
        match self {
            ContentType::Html => "Content-Type: text/html; charset=utf-8",
            ContentType::Json => "Content-Type: application/json",
            ContentType::Text => "Content-Type: text/plain; charset=utf-8",
        }
    }
}

/// Response produced by a controller action, a middleware or the not-found handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: ContentType,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, content_type: ContentType, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ContentType::Html, body)
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, ContentType::Text, body)
    }

    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, ContentType::Json, body.to_string())
    }

    /// The fixed body used when no not-found handler is registered.
    #[must_use]
    pub fn not_found() -> Self {
        Self::text(404, "404 Not Found")
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write `response` onto a `may_minihttp` response.
pub fn write_response(res: &mut may_minihttp::Response, response: &Response) {
    res.status_code(response.status as usize, status_reason(response.status));
    res.header(response.content_type.header_line());
    res.body_vec(response.body.clone().into_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
    }

    #[test]
    fn test_not_found_body() {
        let res = Response::not_found();
        assert_eq!(res.status, 404);
        assert_eq!(res.content_type, ContentType::Text);
        assert_eq!(res.body, "404 Not Found");
    }
}
