//! Tests for the groups client running over real HTTP against a mock identity server

use identity_groups::client::{Client, ClientConfig, ClientError};
use identity_groups::groups::{
    GroupAttributes, GroupsClient, ListGroupUsersOptions, ListGroupsOptions,
};

use mockito::{Matcher, Server, ServerGuard};
use reqwest::StatusCode;
use serde_json::json;

const TOKEN: &str = "test-token";

struct TestController {
    pub server: ServerGuard,
    pub groups: GroupsClient<Client>,
}

impl TestController {
    async fn new() -> TestController {
        let server = Server::new_async().await;
        // Leave off the trailing slash to make sure the client adds it
        let client = Client::builder()
            .auth_token(TOKEN.to_owned())
            .build(&format!("{}/v3", server.url()))
            .expect("unable to setup identity client");
        TestController {
            server,
            groups: GroupsClient::new(client),
        }
    }
}

fn group(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "domain_id": "default",
        "links": {"self": format!("http://localhost/v3/groups/{}", id)}
    })
}

#[tokio::test]
async fn test_group_lifecycle() {
    let mut controller = TestController::new().await;

    let create = controller
        .server
        .mock("POST", "/v3/groups")
        .match_header("x-auth-token", TOKEN)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(
            json!({"group": {"name": "admins", "domain_id": "default"}}),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "group": group("g1", "admins") }).to_string())
        .create_async()
        .await;

    let show = controller
        .server
        .mock("GET", "/v3/groups/g1")
        .with_status(200)
        .with_body(json!({ "group": group("g1", "admins") }).to_string())
        .expect(2)
        .create_async()
        .await;

    let update = controller
        .server
        .mock("PATCH", "/v3/groups/g1")
        .match_body(Matcher::Json(json!({"group": {"name": "x"}})))
        .with_status(200)
        .with_body(json!({ "group": group("g1", "x") }).to_string())
        .create_async()
        .await;

    let delete = controller
        .server
        .mock("DELETE", "/v3/groups/g1")
        .with_status(204)
        .create_async()
        .await;

    let created = controller
        .groups
        .create_group(&GroupAttributes::new().name("admins").domain_id("default"))
        .await
        .expect("unable to create group");
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(
        created
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let group_id = created.into_body().group.id;

    // Showing twice against unchanged state gives the same answer
    let first = controller
        .groups
        .show_group(&group_id)
        .await
        .expect("unable to show group");
    let second = controller
        .groups
        .show_group(&group_id)
        .await
        .expect("unable to show group");
    assert_eq!(first.body().group, second.body().group);

    let updated = controller
        .groups
        .update_group(&group_id, &GroupAttributes::new().name("x"))
        .await
        .expect("unable to update group");
    assert_eq!(updated.body().group.name, "x");

    let deleted = controller
        .groups
        .delete_group(&group_id)
        .await
        .expect("unable to delete group");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    create.assert_async().await;
    show.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_list_groups() {
    let mut controller = TestController::new().await;

    let all = controller
        .server
        .mock("GET", "/v3/groups")
        .with_status(200)
        .with_body(
            json!({
                "groups": [group("g1", "a"), group("g2", "b")],
                "links": {"self": "http://localhost/v3/groups", "previous": null, "next": null}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let filtered = controller
        .server
        .mock("GET", "/v3/groups")
        .match_query(Matcher::UrlEncoded("domain_id".into(), "d1".into()))
        .with_status(200)
        .with_body(json!({"groups": []}).to_string())
        .create_async()
        .await;

    let resp = controller
        .groups
        .list_groups(&ListGroupsOptions::default())
        .await
        .expect("unable to list groups");
    assert_eq!(resp.body().groups.len(), 2);

    let resp = controller
        .groups
        .list_groups(&ListGroupsOptions {
            domain_id: Some("d1".to_owned()),
            ..Default::default()
        })
        .await
        .expect("unable to list filtered groups");
    assert!(resp.body().groups.is_empty());

    all.assert_async().await;
    filtered.assert_async().await;
}

#[tokio::test]
async fn test_membership() {
    let mut controller = TestController::new().await;

    let add = controller
        .server
        .mock("PUT", "/v3/groups/g1/users/u1")
        .match_header("x-auth-token", TOKEN)
        .with_status(204)
        .create_async()
        .await;

    let list = controller
        .server
        .mock("GET", "/v3/groups/g1/users")
        .match_query(Matcher::UrlEncoded("domain_id".into(), "d1".into()))
        .with_status(200)
        .with_body(
            json!({"users": [{"id": "u1", "name": "alice", "domain_id": "d1", "enabled": true}]})
                .to_string(),
        )
        .create_async()
        .await;

    let check = controller
        .server
        .mock("HEAD", "/v3/groups/g1/users/u1")
        .with_status(204)
        .expect(2)
        .create_async()
        .await;

    let remove = controller
        .server
        .mock("DELETE", "/v3/groups/g1/users/u1")
        .with_status(204)
        .create_async()
        .await;

    controller
        .groups
        .add_group_user("g1", "u1")
        .await
        .expect("unable to add user to group");

    let users = controller
        .groups
        .list_group_users(
            "g1",
            &ListGroupUsersOptions {
                domain_id: Some("d1".to_owned()),
                ..Default::default()
            },
        )
        .await
        .expect("unable to list group users");
    assert_eq!(users.body().users[0].id, "u1");

    let resp = controller
        .groups
        .check_group_user_existence("g1", "u1")
        .await
        .expect("user should be in group");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(controller
        .groups
        .is_group_member("g1", "u1")
        .await
        .expect("unable to check membership"));

    controller
        .groups
        .delete_group_user("g1", "u1")
        .await
        .expect("unable to remove user from group");

    add.assert_async().await;
    list.assert_async().await;
    check.assert_async().await;
    remove.assert_async().await;
}

#[tokio::test]
async fn test_missing_membership() {
    let mut controller = TestController::new().await;

    let check = controller
        .server
        .mock("HEAD", "/v3/groups/g1/users/u2")
        .with_status(404)
        .expect(2)
        .create_async()
        .await;

    let err = controller
        .groups
        .check_group_user_existence("g1", "u2")
        .await
        .expect_err("user should not be in group");
    match err {
        ClientError::UnexpectedStatusCode {
            expected, actual, ..
        } => {
            assert_eq!(expected, StatusCode::NO_CONTENT);
            assert_eq!(actual, StatusCode::NOT_FOUND);
        }
        e => panic!("Expected UnexpectedStatusCode, got {:?}", e),
    }

    assert!(!controller
        .groups
        .is_group_member("g1", "u2")
        .await
        .expect("404 should mean not a member"));

    check.assert_async().await;
}

#[tokio::test]
async fn test_unexpected_status_keeps_body() {
    let mut controller = TestController::new().await;

    let create = controller
        .server
        .mock("POST", "/v3/groups")
        .with_status(409)
        .with_body(r#"{"error": {"code": 409, "message": "Duplicate entry"}}"#)
        .expect(1)
        .create_async()
        .await;

    let err = controller
        .groups
        .create_group(&GroupAttributes::new().name("admins"))
        .await
        .expect_err("conflict should fail");
    match err {
        ClientError::UnexpectedStatusCode {
            expected,
            actual,
            body,
        } => {
            assert_eq!(expected, StatusCode::CREATED);
            assert_eq!(actual, StatusCode::CONFLICT);
            assert!(body.contains("Duplicate entry"));
        }
        e => panic!("Expected UnexpectedStatusCode, got {:?}", e),
    }

    // Exactly one request, nothing retried
    create.assert_async().await;
}

#[tokio::test]
async fn test_transport_error_is_propagated() {
    // Nothing should be listening on the discard port
    let client = Client::new("http://127.0.0.1:9/v3/").expect("valid url");
    let groups = GroupsClient::new(client);

    let err = groups
        .show_group("g1")
        .await
        .expect_err("request should not connect");
    assert!(matches!(err, ClientError::HttpClientError(_)));
}

#[tokio::test]
async fn test_client_from_config() {
    let mut server = Server::new_async().await;
    let show = server
        .mock("GET", "/v3/groups/g1")
        .match_header("x-auth-token", "from-config")
        .with_status(200)
        .with_body(json!({ "group": group("g1", "admins") }).to_string())
        .create_async()
        .await;

    let conf = ClientConfig::from_toml_str(&format!(
        "base_url = \"{}/v3/\"\nauth_token = \"from-config\"\ntimeout_secs = 5\n",
        server.url()
    ))
    .expect("config should parse");
    let groups = GroupsClient::new(conf.into_client().expect("client should build"));

    groups.show_group("g1").await.expect("unable to show group");
    show.assert_async().await;
}
