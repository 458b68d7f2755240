// Shared fakes for unit tests.

use crate::error::TransportError;
use crate::http::{ApiResult, HttpExecutor, HttpRequest};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Records every request and replays scripted outcomes in order.
/// Panics if asked for more responses than were scripted.
#[derive(Default)]
pub struct RecordingExecutor {
    requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<Result<ApiResult, TransportError>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status_code: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResult::new(status_code, body.to_string())));
        self
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// JSON body of the `index`th request.
    pub fn body_json(&self, index: usize) -> Value {
        let requests = self.requests.borrow();
        let body = requests[index].body.as_ref().expect("request had no body");
        serde_json::from_slice(body).expect("request body is not JSON")
    }
}

impl HttpExecutor for RecordingExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<ApiResult, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("no scripted response left")
    }
}
