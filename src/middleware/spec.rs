//! Middleware specification strings.
//!
//! Three calling conventions share one string grammar:
//!
//! | Spec                     | Form                                           |
//! |--------------------------|------------------------------------------------|
//! | `Name`                   | construct `Name`, call `handle()`              |
//! | `Name#a&b`               | construct `Name`, call `handle(a, b)`          |
//! | `Name@method:a&b`        | call the static `method(a, b)` on `Name`       |
//!
//! `@` takes precedence over `#`. A string with neither is a bare name; there is no
//! parse error.

use std::fmt;

/// A parsed middleware specification, stored on the route at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareSpec {
    /// `Name`
    Simple(String),
    /// `Name#arg1&arg2`
    WithArgs(String, Vec<String>),
    /// `Name@method` or `Name@method:arg1&arg2`
    StaticCall(String, String, Vec<String>),
}

impl MiddlewareSpec {
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        if let Some((name, rest)) = spec.split_once('@') {
            let (method, args) = match rest.split_once(':') {
                Some((method, params)) => (method, split_args(params)),
                None => (rest, Vec::new()),
            };
            return MiddlewareSpec::StaticCall(name.to_string(), method.to_string(), args);
        }
        if let Some((name, params)) = spec.split_once('#') {
            return MiddlewareSpec::WithArgs(name.to_string(), split_args(params));
        }
        MiddlewareSpec::Simple(spec.to_string())
    }

    /// The middleware name the spec refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MiddlewareSpec::Simple(name)
            | MiddlewareSpec::WithArgs(name, _)
            | MiddlewareSpec::StaticCall(name, _, _) => name,
        }
    }

    /// Positional arguments passed to the middleware.
    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            MiddlewareSpec::Simple(_) => &[],
            MiddlewareSpec::WithArgs(_, args) | MiddlewareSpec::StaticCall(_, _, args) => args,
        }
    }
}

fn split_args(params: &str) -> Vec<String> {
    params.split('&').map(str::to_string).collect()
}

impl From<&str> for MiddlewareSpec {
    fn from(spec: &str) -> Self {
        MiddlewareSpec::parse(spec)
    }
}

impl fmt::Display for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareSpec::Simple(name) => f.write_str(name),
            MiddlewareSpec::WithArgs(name, args) => write!(f, "{name}#{}", args.join("&")),
            MiddlewareSpec::StaticCall(name, method, args) if args.is_empty() => {
                write!(f, "{name}@{method}")
            }
            MiddlewareSpec::StaticCall(name, method, args) => {
                write!(f, "{name}@{method}:{}", args.join("&"))
            }
        }
    }
}
