use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use askama::Template;
use tracing::info;

use super::templates::{ControllerTemplate, MiddlewareTemplate, ViewTemplate, RESOURCE_ACTIONS};
use crate::routes::{parse_routes, save_routes, RouteDef};
use crate::view::ViewPaths;

/// What a scaffold call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scaffold {
    Written(PathBuf),
    /// The file already existed and `force` was not set
    Skipped(PathBuf),
}

impl Scaffold {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Scaffold::Written(path) | Scaffold::Skipped(path) => path,
        }
    }
}

/// HTTP verbs accepted by [`add_routes`], each mapped to a conventional action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteVerb {
    /// `GET <route>` → `index`
    Get,
    /// `POST <route>` → `create`
    Post,
    /// `PUT <route>` → `update`
    Put,
    /// `DELETE <route>/{id}` → `destroy`
    Delete,
}

impl RouteVerb {
    fn definition(self, route: &str, controller: &str) -> RouteDef {
        match self {
            RouteVerb::Get => RouteDef::new("GET", route, &format!("{controller}@index")),
            RouteVerb::Post => RouteDef::new("POST", route, &format!("{controller}@create")),
            RouteVerb::Put => RouteDef::new("PUT", route, &format!("{controller}@update")),
            RouteVerb::Delete => {
                RouteDef::new("DELETE", &format!("{route}/{{id}}"), &format!("{controller}@destroy"))
            }
        }
    }
}

/// Upper-case the first character: `user` → `User`.
#[must_use]
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `user` → `UserController`.
#[must_use]
pub fn controller_class(name: &str) -> String {
    format!("{}Controller", ucfirst(name.trim()))
}

/// `auth` → `AuthMiddleware`.
#[must_use]
pub fn middleware_class(name: &str) -> String {
    format!("{}Middleware", ucfirst(name.trim()))
}

/// `UserController` → `user_controller`.
fn snake_case(class_name: &str) -> String {
    let mut out = String::with_capacity(class_name.len() + 4);
    for (i, c) in class_name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("{kind} name is required");
    }
    Ok(())
}

fn write_file(path: &Path, content: &str, force: bool) -> Result<Scaffold> {
    if path.exists() && !force {
        return Ok(Scaffold::Skipped(path.to_path_buf()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Scaffold written");
    Ok(Scaffold::Written(path.to_path_buf()))
}

/// Generate `<dir>/<name>_controller.rs` with the resource actions.
///
/// # Errors
///
/// Empty names, template rendering and file system failures.
pub fn make_controller(dir: &Path, name: &str, force: bool) -> Result<Scaffold> {
    require_name("Controller", name)?;
    let class_name = controller_class(name);
    let rendered = ControllerTemplate {
        class_name: class_name.clone(),
        actions: RESOURCE_ACTIONS.to_vec(),
    }
    .render()?;
    write_file(&dir.join(format!("{}.rs", snake_case(&class_name))), &rendered, force)
}

/// Generate `<dir>/<name>_middleware.rs`.
///
/// # Errors
///
/// Empty names, template rendering and file system failures.
pub fn make_middleware(dir: &Path, name: &str, force: bool) -> Result<Scaffold> {
    require_name("Middleware", name)?;
    let class_name = middleware_class(name);
    let rendered = MiddlewareTemplate {
        class_name: class_name.clone(),
    }
    .render()?;
    write_file(&dir.join(format!("{}.rs", snake_case(&class_name))), &rendered, force)
}

/// Generate an empty view at the path its dotted name resolves to.
///
/// # Errors
///
/// Empty names, template rendering and file system failures.
pub fn make_view(views: &ViewPaths, name: &str, force: bool) -> Result<Scaffold> {
    require_name("View", name)?;
    let rendered = ViewTemplate {
        name: name.to_string(),
    }
    .render()?;
    write_file(&views.resolve(name), &format!("{rendered}\n"), force)
}

/// Append one route per verb for resource `name` to the manifest at `manifest`.
///
/// The route path is the lower-cased name and the controller defaults to
/// [`controller_class`]. Every middleware spec is attached to every new route.
/// Returns the definitions that were added.
///
/// # Errors
///
/// Empty names or verb lists, and manifest read/parse/write failures.
pub fn add_routes(
    manifest: &Path,
    name: &str,
    verbs: &[RouteVerb],
    controller: Option<&str>,
    middleware: &[String],
) -> Result<Vec<RouteDef>> {
    require_name("Route", name)?;
    if verbs.is_empty() {
        bail!("No method specified (--get, --post, --put, --delete); nothing was added");
    }
    let route = name.trim().trim_matches('/').to_lowercase();
    let controller = controller.map_or_else(|| controller_class(name), str::to_string);

    let added: Vec<RouteDef> = verbs
        .iter()
        .map(|verb| {
            middleware
                .iter()
                .fold(verb.definition(&route, &controller), |def, spec| def.with_middleware(spec))
        })
        .collect();

    let mut defs = if manifest.exists() {
        let content = fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read {}", manifest.display()))?;
        parse_routes(&content)?
    } else {
        Vec::new()
    };
    defs.extend(added.iter().cloned());
    save_routes(manifest, &defs)?;
    info!(manifest = %manifest.display(), added = added.len(), "Routes appended");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(controller_class("user"), "UserController");
        assert_eq!(middleware_class("auth"), "AuthMiddleware");
        assert_eq!(snake_case("UserController"), "user_controller");
        assert_eq!(ucfirst(""), "");
    }

    #[test]
    fn test_verb_definitions() {
        let def = RouteVerb::Delete.definition("posts", "PostController");
        assert_eq!(def.method, "DELETE");
        assert_eq!(def.path, "posts/{id}");
        assert_eq!(def.action, "PostController@destroy");
        assert_eq!(RouteVerb::Post.definition("posts", "P").action, "P@create");
    }
}
