//! Route manifest: a YAML list of route definitions registered in file order.
//!
//! ```yaml
//! - method: GET
//!   path: users/{id}
//!   action: UserController@show
//!   middleware: [Auth#secret, "Role@allow:admin&editor"]
//! - method: ANY
//!   path: ping
//!   action: PingController@index
//! ```

mod load;
mod types;

pub use load::{build_table, load_routes, parse_routes, save_routes};
pub use types::RouteDef;
