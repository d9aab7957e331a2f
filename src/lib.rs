//! A client for the group and group membership endpoints of a v3 identity API (such as OpenStack
//! Keystone).
//!
//! ```no_run
//! use identity_groups::client::Client;
//! use identity_groups::groups::{GroupAttributes, GroupsClient};
//!
//! # async fn run() -> identity_groups::client::Result<()> {
//! let client = Client::builder()
//!     .auth_token("my-token".to_owned())
//!     .build("http://keystone.example.com:5000/v3/")?;
//! let groups = GroupsClient::new(client);
//!
//! let created = groups
//!     .create_group(&GroupAttributes::new().name("admins").domain_id("default"))
//!     .await?;
//! groups.add_group_user(&created.body().group.id, "some-user-id").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod groups;
#[cfg(any(test, feature = "test-tools"))]
pub mod testing;

pub use client::{Client, ClientError, ResponseEnvelope, RestClient};
pub use groups::GroupsClient;
