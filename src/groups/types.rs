use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A group as returned by the identity API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
    /// Any attributes not covered by the fields above
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Attributes sent when creating or updating a group. Fields left as `None` are not sent at all,
/// so an update only touches what is set here.
///
/// The typed fields and `extra` are merged into a single JSON object when serialized. If a key is
/// present in both, the typed field wins, so a key is never sent twice
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GroupAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    /// Attributes the server understands that aren't modeled here
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        GroupAttributes::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.extra.remove("name");
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.extra.remove("description");
        self.description = Some(description.into());
        self
    }

    pub fn domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.extra.remove("domain_id");
        self.domain_id = Some(domain_id.into());
        self
    }

    /// Sets an arbitrary attribute. String values for `name`, `description` and `domain_id` go to
    /// the typed fields; any other value for those keys (such as `null` to clear a description)
    /// replaces the typed field instead
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let typed = match key.as_str() {
            "name" => Some(&mut self.name),
            "description" => Some(&mut self.description),
            "domain_id" => Some(&mut self.domain_id),
            _ => None,
        };
        match (typed, value.into()) {
            (Some(field), Value::String(s)) => {
                *field = Some(s);
                self.extra.remove(&key);
            }
            (Some(field), other) => {
                *field = None;
                self.extra.insert(key, other);
            }
            (None, other) => {
                self.extra.insert(key, other);
            }
        }
        self
    }
}

impl Serialize for GroupAttributes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map: serde_json::Map<String, Value> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let typed = [
            ("name", &self.name),
            ("description", &self.description),
            ("domain_id", &self.domain_id),
        ];
        for (key, value) in typed {
            if let Some(v) = value {
                map.insert(key.to_owned(), Value::String(v.clone()));
            }
        }
        map.serialize(serializer)
    }
}

/// A user as listed in a group's membership
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `links` object attached to resources and collections
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResourceLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// The `{"group": {...}}` wrapper used for single group requests and responses
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GroupBody<T = Group> {
    pub group: T,
}

/// Response body for listing groups
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GroupsBody {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub links: Option<ResourceLinks>,
}

/// Response body for listing the users in a group
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UsersBody {
    pub users: Vec<User>,
    #[serde(default)]
    pub links: Option<ResourceLinks>,
}

/// Query parameters for listing groups. Any parameter left unset is not sent
#[derive(Serialize, Debug, Clone, Default)]
pub struct ListGroupsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Additional filters passed through as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Query parameters for listing the users in a group. Any parameter left unset is not sent
#[derive(Serialize, Debug, Clone, Default)]
pub struct ListGroupUsersOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Filter expression such as `lt:2016-12-08T22:02:00Z`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_expires_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}
