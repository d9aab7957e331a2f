//! The set of HTTP operations every resource client is built on. Resource clients (such as
//! [`GroupsClient`](crate::groups::GroupsClient)) are handed something implementing
//! [`RestClient`] and only ever talk to the API through it, which lets the real
//! [`Client`](super::Client) be swapped for a test double.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ClientError, Result};

/// A raw response as returned by a [`RestClient`], before any status checking or parsing
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Parses the body as JSON into the requested type
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Consumes the response, parsing the body into `T` and wrapping it in a [`ResponseEnvelope`]
    pub fn into_envelope<T: DeserializeOwned>(self) -> Result<ResponseEnvelope<T>> {
        let body = self.json()?;
        Ok(ResponseEnvelope {
            status: self.status,
            headers: self.headers,
            body,
        })
    }

    /// Consumes the response without looking at the body. Used for no content responses
    pub fn into_empty_envelope(self) -> ResponseEnvelope<()> {
        ResponseEnvelope {
            status: self.status,
            headers: self.headers,
            body: (),
        }
    }
}

/// The result of a successful API operation: the status code, the response headers and the
/// parsed body. Operations that return no content use `ResponseEnvelope<()>`
#[derive(Debug, Clone)]
pub struct ResponseEnvelope<T> {
    status: StatusCode,
    headers: HeaderMap,
    body: T,
}

impl<T> ResponseEnvelope<T> {
    /// The status code of the response, always the one the operation expected
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The parsed response body
    pub fn body(&self) -> &T {
        &self.body
    }

    /// Drops the status and headers, returning only the parsed body
    pub fn into_body(self) -> T {
        self.body
    }
}

/// The HTTP operations needed to talk to an identity API. Implementors only need to provide
/// [`request`](RestClient::request); the verb helpers and status check are provided.
///
/// Paths are relative to whatever base URL the implementor is configured with (e.g. `groups` or
/// `groups/1234/users`). Bodies are always JSON.
#[async_trait::async_trait]
pub trait RestClient: Send + Sync {
    /// Performs exactly one request and returns the raw response. Transport errors must be
    /// returned as-is and a non-success status code is not an error at this level
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse>;

    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.request(Method::GET, path, None).await
    }

    async fn head(&self, path: &str) -> Result<RawResponse> {
        self.request(Method::HEAD, path, None).await
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.request(Method::DELETE, path, None).await
    }

    async fn post(&self, path: &str, body: Vec<u8>) -> Result<RawResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<RawResponse> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse> {
        self.request(Method::PUT, path, body).await
    }

    /// Checks that the response has the expected status code, returning the response if it does
    fn expected_success(&self, expected: StatusCode, resp: RawResponse) -> Result<RawResponse> {
        expected_success(expected, resp)
    }
}

/// Returns the response untouched if its status is `expected`, otherwise an
/// [`UnexpectedStatusCode`](ClientError::UnexpectedStatusCode) error containing the body
pub fn expected_success(expected: StatusCode, resp: RawResponse) -> Result<RawResponse> {
    if resp.status == expected {
        return Ok(resp);
    }
    debug!(%expected, actual = %resp.status, "Got unexpected status code from server");
    Err(ClientError::UnexpectedStatusCode {
        expected,
        actual: resp.status,
        body: String::from_utf8_lossy(&resp.body).into_owned(),
    })
}
