use askama::Template;

/// One generated controller action.
#[derive(Debug, Clone)]
pub struct ActionStub {
    pub name: &'static str,
    pub summary: &'static str,
    /// Whether the action reads the first path parameter as an id
    pub takes_id: bool,
}

/// The resource actions every scaffolded controller starts with.
pub const RESOURCE_ACTIONS: [ActionStub; 6] = [
    ActionStub { name: "index", summary: "List all records.", takes_id: false },
    ActionStub { name: "create", summary: "Show the creation form.", takes_id: false },
    ActionStub { name: "store", summary: "Persist a new record.", takes_id: false },
    ActionStub { name: "edit", summary: "Show the edit form.", takes_id: true },
    ActionStub { name: "update", summary: "Apply changes to a record.", takes_id: true },
    ActionStub { name: "destroy", summary: "Delete a record.", takes_id: true },
];

#[derive(Template)]
#[template(path = "controller.rs.txt", escape = "none")]
pub struct ControllerTemplate {
    pub class_name: String,
    pub actions: Vec<ActionStub>,
}

#[derive(Template)]
#[template(path = "middleware.rs.txt", escape = "none")]
pub struct MiddlewareTemplate {
    pub class_name: String,
}

#[derive(Template)]
#[template(path = "view.nixs.html", escape = "none")]
pub struct ViewTemplate {
    pub name: String,
}
