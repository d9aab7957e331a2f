//! Client implementation for consuming a v3 identity API. The [`Client`] type handles the
//! transport (base URL, authentication header, TLS options) and implements [`RestClient`], which
//! the resource clients in this crate are built on top of.

pub mod config;
mod error;
pub mod rest;

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as HttpClient;
use reqwest::Method;
use tracing::{info, instrument, trace};
use url::Url;

pub use config::ClientConfig;
pub use error::ClientError;
pub use rest::{RawResponse, ResponseEnvelope, RestClient};

/// A shorthand `Result` type that always uses `ClientError` as its error variant
pub type Result<T> = std::result::Result<T, ClientError>;

/// The header used by the identity API to carry a token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
const JSON_MIME_TYPE: &str = "application/json";

/// A client type for interacting with an identity API
#[derive(Clone)]
pub struct Client {
    client: HttpClient,
    base_url: Url,
}

/// A builder for for setting up a `Client`. Created using `Client::builder`
#[derive(Default)]
pub struct ClientBuilder {
    http2_prior_knowledge: bool,
    danger_accept_invalid_certs: bool,
    auth_token: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Controls whether the client assumes HTTP/2 or attempts to negotiate it. Defaults to false.
    pub fn http2_prior_knowledge(mut self, http2_prior_knowledge: bool) -> Self {
        self.http2_prior_knowledge = http2_prior_knowledge;
        self
    }

    /// Controls whether the client accepts invalid certificates. The default is to reject invalid
    /// certificates. It is sometimes necessary to set this option in dev-test situations where you
    /// may be working with self-signed certificates or the like. Defaults to false.
    pub fn danger_accept_invalid_certs(mut self, danger_accept_invalid_certs: bool) -> Self {
        self.danger_accept_invalid_certs = danger_accept_invalid_certs;
        self
    }

    /// Sets the token sent in the `X-Auth-Token` header on every request. Obtaining and refreshing
    /// the token is up to the caller
    pub fn auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Sets a timeout for each whole request. No timeout is set by default. A zero timeout is
    /// rejected when building the client
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns a new Client with the given URL, configured using the set options.
    ///
    /// This URL should be the FQDN plus the API version, so for a keystone server it would look
    /// something like `http://keystone.example.com:5000/v3/`. Will return an error if the URL is
    /// not valid
    pub fn build(self, base_url: &str) -> Result<Client> {
        let (base_parsed, mut headers) = base_url_and_headers(base_url)?;

        if self.timeout == Some(Duration::ZERO) {
            return Err(ClientError::InvalidConfig(
                "Timeout must be greater than zero".to_owned(),
            ));
        }

        if let Some(token) = self.auth_token {
            let mut header_val = HeaderValue::from_str(&token)
                .map_err(|e| ClientError::InvalidConfig(format!("Invalid auth token: {}", e)))?;
            header_val.set_sensitive(true);
            headers.insert(AUTH_TOKEN_HEADER, header_val);
        }

        let client = HttpClient::builder()
            .and_if(self.http2_prior_knowledge, |b| b.http2_prior_knowledge())
            .and_if(self.danger_accept_invalid_certs, |b| {
                b.danger_accept_invalid_certs(true)
            })
            .and_some(self.timeout, |b, t| b.timeout(t))
            .default_headers(headers)
            .build()?;
        Ok(Client {
            client,
            base_url: base_parsed,
        })
    }
}

fn base_url_and_headers(base_url: &str) -> Result<(Url, HeaderMap)> {
    // Note that the trailing slash is important, otherwise the URL parser will treat the version
    // as a "file" component of the URL and `groups` would replace it when joined
    let mut base = base_url.to_owned();
    if !base.ends_with('/') {
        info!("Provided base URL missing trailing slash, adding...");
        base.push('/');
    }
    let base_parsed = Url::parse(&base)?;
    if base_parsed.cannot_be_a_base() {
        return Err(ClientError::InvalidConfig(format!(
            "{} cannot be used as a base URL",
            base_url
        )));
    }
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_MIME_TYPE));
    Ok((base_parsed, headers))
}

impl Client {
    /// Returns a new Client with the given URL, configured using the default options.
    ///
    /// See [`ClientBuilder::build`] for what the URL should look like
    pub fn new(base_url: &str) -> Result<Self> {
        ClientBuilder::default().build(base_url)
    }

    /// Returns a [`ClientBuilder`](ClientBuilder) configured with defaults
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The base URL all request paths are joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a raw request using the underlying HTTP client and returns the raw response. The
    /// path is just the path part of your URL (plus an optional query string). It will be joined
    /// with the configured base URL for the client.
    #[instrument(level = "trace", skip(self, body))]
    pub async fn raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        let req = self.client.request(method, self.base_url.join(path)?);
        let req = match body {
            Some(b) => req.header(header::CONTENT_TYPE, JSON_MIME_TYPE).body(b),
            None => req,
        };
        trace!(?req);
        Ok(req.send().await?)
    }
}

#[async_trait::async_trait]
impl RestClient for Client {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let resp = self.raw(method, path, body).await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        trace!(%status, body_len = body.len(), "Received response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

trait ConditionalBuilder: Sized {
    fn and_if(self, condition: bool, build_method: impl Fn(Self) -> Self) -> Self {
        if condition {
            build_method(self)
        } else {
            self
        }
    }

    fn and_some<T>(self, value: Option<T>, build_method: impl Fn(Self, T) -> Self) -> Self {
        match value {
            Some(v) => build_method(self, v),
            None => self,
        }
    }
}

impl ConditionalBuilder for reqwest::ClientBuilder {}
