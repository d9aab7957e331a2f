//! Some helpful utilities for testing. This module is only available if the `test-tools` feature is
//! enabled. Its main feature is [`MockRestClient`], an in-memory [`RestClient`] that records every
//! request it is given and answers with canned responses, so resource clients can be tested
//! without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use crate::client::{ClientError, RawResponse, RestClient, Result};

/// A request as seen by [`MockRestClient`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Returns the body parsed as JSON. Panics if there is a body that isn't valid JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .map(|b| serde_json::from_slice(b).expect("request body should be valid JSON"))
    }
}

#[derive(Default)]
struct State {
    requests: Vec<RecordedRequest>,
    responses: VecDeque<RawResponse>,
}

/// A [`RestClient`] that returns queued responses in order. Clones share the same queue and
/// request log, so a clone can be handed to the client under test while the original is used for
/// assertions
#[derive(Clone, Default)]
pub struct MockRestClient {
    state: Arc<Mutex<State>>,
}

impl MockRestClient {
    pub fn new() -> Self {
        MockRestClient::default()
    }

    /// Queues a response with the given status and raw body
    pub fn respond(&self, status: StatusCode, body: &str) {
        self.push(RawResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_owned()),
        })
    }

    /// Queues a response with the given status and JSON body
    pub fn respond_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push(RawResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    /// Queues a fully formed response
    pub fn push(&self, resp: RawResponse) {
        self.lock().responses.push_back(resp);
    }

    /// Returns all requests made so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic in another test thread shouldn't hide the requests we recorded
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl RestClient for MockRestClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.to_owned(),
            body,
        });
        state.responses.pop_front().ok_or_else(|| {
            ClientError::Other(format!("No response queued for {} {}", method, path))
        })
    }
}
