//! Scripted transport for tests.
//!
//! Responses are queued per URL fragment; a request is answered by the first
//! registered fragment it contains that still has a queued response.
//! Unmatched requests get a 404.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::HttpError;
use crate::host::http::{HttpRequest, HttpResponse, Transport};

struct Route {
    fragment: String,
    responses: VecDeque<HttpResponse>,
}

/// A [`Transport`] that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for requests whose URL contains `fragment`.
    pub fn on(self, fragment: &str, status: u16, body: impl Into<String>) -> Self {
        let response = HttpResponse::new(status, body);
        {
            let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            match routes.iter_mut().find(|r| r.fragment == fragment) {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    fragment: fragment.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests whose URL contains `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let response = {
            let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            routes
                .iter_mut()
                .find(|r| request.url.contains(&r.fragment) && !r.responses.is_empty())
                .and_then(|r| r.responses.pop_front())
                .unwrap_or_else(|| HttpResponse::new(404, format!("unscripted: {}", request.url)))
        };
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        Ok(response)
    }
}
