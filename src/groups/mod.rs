//! A client for the group endpoints of the identity API: creating, reading, updating and deleting
//! groups, and managing which users belong to them.
//!
//! Every operation is a single request whose response must carry exactly one expected status
//! code. Anything else is returned as
//! [`ClientError::UnexpectedStatusCode`](crate::client::ClientError::UnexpectedStatusCode).

mod types;

use std::borrow::Cow;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, trace};
use url::form_urlencoded;

use crate::client::{ClientError, ResponseEnvelope, RestClient, Result};

pub use types::*;

pub const GROUPS_ENDPOINT: &str = "groups";
const USERS_SEGMENT: &str = "users";

/// Client for the `groups` resource. Generic over the [`RestClient`] it sends requests with, which
/// will normally be a [`Client`](crate::client::Client)
#[derive(Clone)]
pub struct GroupsClient<C> {
    rest: C,
}

impl<C: RestClient> GroupsClient<C> {
    pub fn new(rest: C) -> Self {
        GroupsClient { rest }
    }

    /// Returns a reference to the underlying [`RestClient`]
    pub fn rest(&self) -> &C {
        &self.rest
    }

    //////////////// Groups ////////////////

    /// Creates a group with the given attributes. Expects a `201 Created`
    #[instrument(level = "trace", skip(self, attrs), fields(name = ?attrs.name))]
    pub async fn create_group(
        &self,
        attrs: &GroupAttributes,
    ) -> Result<ResponseEnvelope<GroupBody>> {
        let body = serde_json::to_vec(&GroupBody { group: attrs })?;
        let resp = self.rest.post(GROUPS_ENDPOINT, body).await?;
        self.rest
            .expected_success(StatusCode::CREATED, resp)?
            .into_envelope()
    }

    /// Returns the details of a single group
    #[instrument(level = "trace", skip(self))]
    pub async fn show_group(&self, group_id: &str) -> Result<ResponseEnvelope<GroupBody>> {
        let resp = self.rest.get(&group_path(group_id)?).await?;
        self.rest.expected_success(StatusCode::OK, resp)?.into_envelope()
    }

    /// Lists groups, filtered by the given options. Default options list everything visible to the
    /// caller
    #[instrument(level = "trace", skip(self))]
    pub async fn list_groups(
        &self,
        opts: &ListGroupsOptions,
    ) -> Result<ResponseEnvelope<GroupsBody>> {
        let path = with_query(GROUPS_ENDPOINT.to_owned(), opts)?;
        let resp = self.rest.get(&path).await?;
        self.rest.expected_success(StatusCode::OK, resp)?.into_envelope()
    }

    /// Updates the given group. Only the attributes that are set are sent
    #[instrument(level = "trace", skip(self, attrs))]
    pub async fn update_group(
        &self,
        group_id: &str,
        attrs: &GroupAttributes,
    ) -> Result<ResponseEnvelope<GroupBody>> {
        let body = serde_json::to_vec(&GroupBody { group: attrs })?;
        let resp = self.rest.patch(&group_path(group_id)?, body).await?;
        self.rest.expected_success(StatusCode::OK, resp)?.into_envelope()
    }

    /// Deletes the group. Expects a `204 No Content`
    #[instrument(level = "trace", skip(self))]
    pub async fn delete_group(&self, group_id: &str) -> Result<ResponseEnvelope<()>> {
        let resp = self.rest.delete(&group_path(group_id)?).await?;
        Ok(self
            .rest
            .expected_success(StatusCode::NO_CONTENT, resp)?
            .into_empty_envelope())
    }

    //////////////// Membership ////////////////

    /// Adds a user to a group
    #[instrument(level = "trace", skip(self))]
    pub async fn add_group_user(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<ResponseEnvelope<()>> {
        let resp = self
            .rest
            .put(&membership_path(group_id, user_id)?, None)
            .await?;
        Ok(self
            .rest
            .expected_success(StatusCode::NO_CONTENT, resp)?
            .into_empty_envelope())
    }

    /// Lists the users in a group
    #[instrument(level = "trace", skip(self))]
    pub async fn list_group_users(
        &self,
        group_id: &str,
        opts: &ListGroupUsersOptions,
    ) -> Result<ResponseEnvelope<UsersBody>> {
        let path = with_query(format!("{}/{}", group_path(group_id)?, USERS_SEGMENT), opts)?;
        let resp = self.rest.get(&path).await?;
        self.rest.expected_success(StatusCode::OK, resp)?.into_envelope()
    }

    /// Removes a user from a group
    #[instrument(level = "trace", skip(self))]
    pub async fn delete_group_user(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<ResponseEnvelope<()>> {
        let resp = self.rest.delete(&membership_path(group_id, user_id)?).await?;
        Ok(self
            .rest
            .expected_success(StatusCode::NO_CONTENT, resp)?
            .into_empty_envelope())
    }

    /// Checks that the user belongs to the group. Membership is signalled purely by a
    /// `204 No Content`, so a user outside the group comes back as an
    /// [`UnexpectedStatusCode`](ClientError::UnexpectedStatusCode) error carrying a 404. Use
    /// [`is_group_member`](GroupsClient::is_group_member) to get a plain boolean instead
    #[instrument(level = "trace", skip(self))]
    pub async fn check_group_user_existence(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<ResponseEnvelope<()>> {
        let resp = self.rest.head(&membership_path(group_id, user_id)?).await?;
        Ok(self
            .rest
            .expected_success(StatusCode::NO_CONTENT, resp)?
            .into_empty_envelope())
    }

    /// Same as [`check_group_user_existence`](GroupsClient::check_group_user_existence), but
    /// returns `false` instead of an error when the server answers `404 Not Found`
    #[instrument(level = "trace", skip(self))]
    pub async fn is_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        match self.check_group_user_existence(group_id, user_id).await {
            Ok(_) => Ok(true),
            Err(ClientError::UnexpectedStatusCode {
                actual: StatusCode::NOT_FOUND,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Percent-encodes an identifier so it stays a single path segment. Identifiers that would be
/// resolved away as dot segments (or are empty) are rejected before anything is sent
fn path_segment(id: &str) -> Result<Cow<'_, str>> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(ClientError::InvalidId(format!(
            "{:?} cannot be used as a path segment",
            id
        )));
    }
    Ok(urlencoding::encode(id))
}

fn group_path(group_id: &str) -> Result<String> {
    Ok(format!("{}/{}", GROUPS_ENDPOINT, path_segment(group_id)?))
}

fn membership_path(group_id: &str, user_id: &str) -> Result<String> {
    Ok(format!(
        "{}/{}/{}",
        group_path(group_id)?,
        USERS_SEGMENT,
        path_segment(user_id)?
    ))
}

/// Appends the URL encoded form of `opts` to `path`. If no options are set, the path is returned
/// without a `?`
fn with_query<T: Serialize>(mut path: String, opts: &T) -> Result<String> {
    let params = match serde_json::to_value(opts)? {
        Value::Object(map) => map,
        Value::Null => return Ok(path),
        other => {
            return Err(ClientError::Other(format!(
                "Query options must serialize to a map, got {}",
                other
            )))
        }
    };
    if params.is_empty() {
        return Ok(path);
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter() {
        match value {
            Value::Null => continue,
            Value::String(s) => serializer.append_pair(key, s),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    let query = serializer.finish();
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query);
    }
    trace!(%path, "Built path with query");
    Ok(path)
}
