//! Configuration for building a [`Client`](super::Client) from a file or any other serde source

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Client, ClientBuilder, Result};

/// Everything needed to build a [`Client`]. Only `base_url` is required when deserializing.
///
/// ```toml
/// base_url = "https://keystone.example.com:5000/v3"
/// auth_token = "gAAAAABf..."
/// timeout_secs = 30
/// ```
#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub http2_prior_knowledge: bool,
    #[serde(default)]
    pub danger_accept_invalid_certs: bool,
    /// Per request timeout. Must be greater than zero if set
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("http2_prior_knowledge", &self.http2_prior_knowledge)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Parses a configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Loads a TOML configuration file from the given path
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "Loading client configuration");
        let data = tokio::fs::read(path).await?;
        Ok(toml::from_slice(&data)?)
    }

    /// Converts the configuration into a builder, for callers that want to tweak it further
    pub fn builder(&self) -> ClientBuilder {
        let mut builder = Client::builder()
            .http2_prior_knowledge(self.http2_prior_knowledge)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }

    /// Builds a client from this configuration
    pub fn into_client(self) -> Result<Client> {
        self.builder().build(&self.base_url)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::ClientError;

    #[test]
    fn test_minimal_config() {
        let conf = ClientConfig::from_toml_str(r#"base_url = "http://localhost:5000/v3""#)
            .expect("minimal config should parse");
        assert_eq!(conf.base_url, "http://localhost:5000/v3");
        assert!(conf.auth_token.is_none());
        assert!(!conf.danger_accept_invalid_certs);
        assert!(conf.timeout_secs.is_none());

        let client = conf.into_client().expect("client should build");
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/v3/");
    }

    #[test]
    fn test_full_config() {
        let conf = ClientConfig::from_toml_str(
            r#"
            base_url = "https://keystone.example.com/identity/v3/"
            auth_token = "abc123"
            http2_prior_knowledge = false
            danger_accept_invalid_certs = true
            timeout_secs = 10
            "#,
        )
        .expect("full config should parse");
        assert_eq!(conf.auth_token.as_deref(), Some("abc123"));
        assert!(conf.danger_accept_invalid_certs);
        assert_eq!(conf.timeout_secs, Some(10));
        conf.into_client().expect("client should build");
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = ClientConfig::from_toml_str(
            r#"
            base_url = "http://localhost:5000/v3"
            retries = 3
            "#,
        )
        .expect_err("unknown field should fail");
        assert!(matches!(err, ClientError::InvalidToml(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let conf = ClientConfig {
            base_url: "http://localhost:5000/v3".to_owned(),
            auth_token: Some("super-secret".to_owned()),
            ..Default::default()
        };
        let printed = format!("{:?}", conf);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let conf = ClientConfig::from_toml_str(
            r#"
            base_url = "http://localhost:5000/v3"
            timeout_secs = 0
            "#,
        )
        .expect("config should parse");
        let err = conf.into_client().err().expect("zero timeout should fail");
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("unable to create tempdir");
        let path = dir.path().join("identity.toml");
        tokio::fs::write(&path, "base_url = \"http://localhost:5000/v3\"\ntimeout_secs = 5\n")
            .await
            .expect("unable to write config");

        let conf = ClientConfig::load(&path).await.expect("config should load");
        assert_eq!(conf.timeout_secs, Some(5));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ClientConfig::load("/definitely/not/here.toml")
            .await
            .expect_err("missing file should fail");
        assert!(matches!(err, ClientError::Io(_)));
    }
}
