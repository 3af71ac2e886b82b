use std::fmt;

use crate::view::ViewError;

/// A name that could not be resolved to something callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No controller registered under this name
    Controller(String),
    /// Controller exists but has no such action
    Action { controller: String, method: String },
    /// No middleware registered under this name
    Middleware(String),
    /// Middleware has only static operations but was used as `Name` or `Name#args`
    MiddlewareHandle(String),
    /// `Name@method` names a static operation that does not exist
    MiddlewareMethod { middleware: String, method: String },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::Controller(name) => write!(f, "Controller {name} not found."),
            Unresolved::Action { controller, method } => {
                write!(f, "Method {method} not found in {controller}.")
            }
            Unresolved::Middleware(name) => write!(f, "Middleware class {name} not found."),
            Unresolved::MiddlewareHandle(name) => write!(f, "handle() not found in {name}."),
            Unresolved::MiddlewareMethod { middleware, method } => {
                write!(f, "Method {method} not found in middleware {middleware}.")
            }
        }
    }
}

impl std::error::Error for Unresolved {}

/// Errors that abort a dispatch.
#[derive(Debug)]
pub enum DispatchError {
    /// A controller, action or middleware name did not resolve
    UnresolvedHandler(Unresolved),
    /// A controller action failed to render its view
    View(ViewError),
    /// A controller action failed for any other reason
    Action(anyhow::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnresolvedHandler(err) => write!(f, "unresolved handler: {err}"),
            DispatchError::View(err) => write!(f, "view error: {err}"),
            DispatchError::Action(err) => write!(f, "action failed: {err:#}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::UnresolvedHandler(err) => Some(err),
            DispatchError::View(err) => Some(err),
            DispatchError::Action(err) => Some(err.as_ref()),
        }
    }
}

impl From<Unresolved> for DispatchError {
    fn from(err: Unresolved) -> Self {
        DispatchError::UnresolvedHandler(err)
    }
}

impl From<ViewError> for DispatchError {
    fn from(err: ViewError) -> Self {
        DispatchError::View(err)
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Action(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_messages() {
        assert_eq!(
            Unresolved::Controller("UserController".into()).to_string(),
            "Controller UserController not found."
        );
        assert_eq!(
            Unresolved::Action {
                controller: "UserController".into(),
                method: "show".into()
            }
            .to_string(),
            "Method show not found in UserController."
        );
        assert_eq!(
            Unresolved::MiddlewareHandle("Role".into()).to_string(),
            "handle() not found in Role."
        );
    }

    #[test]
    fn test_dispatch_error_wraps_unresolved() {
        let err: DispatchError = Unresolved::Middleware("Auth".into()).into();
        assert!(matches!(err, DispatchError::UnresolvedHandler(_)));
        assert_eq!(
            err.to_string(),
            "unresolved handler: Middleware class Auth not found."
        );
    }
}
