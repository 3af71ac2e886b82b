use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::Arc;

use arc_swap::ArcSwap;
use may_minihttp::HttpService;
use tracing::{error, info_span, warn};

use super::request::Request;
use super::response::{write_response, Response};
use crate::dispatcher::Dispatcher;
use crate::router::RouteTable;

/// `may_minihttp` service that decodes each request and hands it to the [`Dispatcher`].
///
/// The route table sits behind an [`ArcSwap`] so [`watch_routes`](crate::hot_reload::watch_routes)
/// can replace it while requests are in flight.
pub struct AppService {
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub dispatcher: Arc<Dispatcher>,
    pub watcher: Option<notify::RecommendedWatcher>,
}

impl Clone for AppService {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
            dispatcher: Arc::clone(&self.dispatcher),
            watcher: None,
        }
    }
}

impl AppService {
    #[must_use]
    pub fn new(routes: Arc<ArcSwap<RouteTable>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            routes,
            dispatcher,
            watcher: None,
        }
    }

    /// Dispatch a decoded request against the current route table.
    ///
    /// Fatal dispatch errors become a 500 response carrying the diagnostic.
    #[must_use]
    pub fn handle(&self, request: &Request) -> Response {
        let routes = self.routes.load();
        match self.dispatcher.dispatch(&routes, request) {
            Ok(response) => response,
            Err(err) => {
                error!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path(),
                    error = %err,
                    "Dispatch aborted"
                );
                Response::text(500, format!("500 Internal Server Error\n{err}"))
            }
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: may_minihttp::Request, res: &mut may_minihttp::Response) -> io::Result<()> {
        let method = req.method().to_string();
        let uri = req.path().to_string();
        let headers: HashMap<String, String> = req
            .headers()
            .iter()
            .map(|h| {
                (
                    h.name.to_ascii_lowercase(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect();
        let mut body = Vec::new();
        req.body().read_to_end(&mut body)?;

        let request = match Request::from_parts(&method, &uri, headers, &body) {
            Ok(request) => request,
            Err(err) => {
                warn!(method = %method, error = %err, "Rejecting request with invalid method");
                write_response(res, &Response::text(400, "400 Bad Request"));
                return Ok(());
            }
        };

        let span = info_span!(
            "request",
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path()
        );
        let _entered = span.enter();
        let response = self.handle(&request);
        write_response(res, &response);
        Ok(())
    }
}
