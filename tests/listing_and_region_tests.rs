//! Integration tests for collection listing and region discovery.

use azure_arm::auth::StaticTokenAuthorizer;
use azure_arm::{ArmConfig, Capability, ResourceClient, ResourceGroupTable, SubscriptionId};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer, subscription: Option<&str>) -> ResourceClient {
    let config = ArmConfig::builder()
        .base_endpoint(server.uri())
        .resource_groups(
            ResourceGroupTable::builder()
                .entry("Microsoft.Compute/disks", "disks-rg")
                .build(),
        )
        .build()
        .unwrap();
    ResourceClient::new(
        config,
        Arc::new(StaticTokenAuthorizer::new("test-token")),
        subscription.map(|s| SubscriptionId::new(s).unwrap()),
    )
    .unwrap()
}

async fn mount_locations(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/locations"))
        .and(query_param("api-version", "2016-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "id": "/subscriptions/sub-1/locations/eastus",
                    "name": "eastus",
                    "displayName": "East US",
                    "latitude": "37.3719",
                    "longitude": "-79.8164"
                },
                {
                    "id": "/subscriptions/sub-1/locations/westeurope",
                    "name": "westeurope",
                    "displayName": "West Europe"
                }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_subscriptions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .and(query_param("api-version", "2016-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"subscriptionId": "sub-0", "displayName": "Other", "state": "Enabled"},
                {"subscriptionId": "sub-1", "displayName": "Primary", "state": "Enabled"}
            ]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_all_follows_next_link_in_order() {
    let server = MockServer::start().await;
    let second_page = format!("{}/next/disks?page=2", server.uri());
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/providers/Microsoft.Compute/disks"))
        .and(query_param("api-version", "2018-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"name": "a"}, {"name": "b"}],
            "nextLink": second_page
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next/disks"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"name": "c"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("sub-1"));
    let disks: Vec<Value> = client.list_all("Microsoft.Compute/disks").await.unwrap();
    let names: Vec<&str> = disks.iter().filter_map(|d| d["name"].as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_all_of_unregistered_type_uses_default_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/providers/Microsoft.Network/loadBalancers"))
        .and(query_param("api-version", "2016-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"name": "lb"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("sub-1"));
    let balancers: Vec<Value> = client
        .list_all("Microsoft.Network/loadBalancers")
        .await
        .unwrap();
    assert_eq!(balancers.len(), 1);
}

#[tokio::test]
async fn test_list_pages_exposes_continuation() {
    let server = MockServer::start().await;
    let second_page = format!("{}/next/disks", server.uri());
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/providers/Microsoft.Compute/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [1],
            "nextLink": second_page
        })))
        .mount(&server)
        .await;

    let client = create_client(&server, Some("sub-1"));
    let mut pages = client.list_pages::<u32>("Microsoft.Compute/disks").unwrap();
    let page = pages.next_page().await.unwrap().unwrap();

    assert_eq!(page.items, vec![1]);
    assert_eq!(pages.continuation(), Some(second_page.as_str()));
    assert_eq!(pages.pages_fetched(), 1);
}

#[tokio::test]
async fn test_list_by_type_scopes_to_resource_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/subscriptions/sub-1/resourceGroups/disks-rg/providers/Microsoft.Compute/disks",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"name": "d1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server, Some("sub-1"));
    let disks: Vec<Value> = client.list_by_type("Microsoft.Compute/disks").await.unwrap();
    assert_eq!(disks.len(), 1);
}

#[tokio::test]
async fn test_sub_accounts_counts_subscriptions() {
    let server = MockServer::start().await;
    mount_subscriptions(&server).await;

    let client = create_client(&server, None);
    let accounts = client.sub_accounts().await.unwrap();

    assert_eq!(accounts.total, 2);
    assert_eq!(accounts.data[1]["displayName"], "Primary");
}

// ============================================================================
// Regions
// ============================================================================

#[tokio::test]
async fn test_regions_are_discovered_once() {
    let server = MockServer::start().await;
    mount_locations(&server).await;
    mount_subscriptions(&server).await;

    let client = create_client(&server, Some("sub-1"));
    let catalog = client.regions().await.unwrap();

    assert_eq!(catalog.regions().len(), 2);
    assert_eq!(catalog.subscription_name(), Some("Primary"));
    assert_eq!(
        catalog.regions()[0].subscription_id.as_deref(),
        Some("sub-1")
    );

    let east = client.region("eastus").await.unwrap();
    assert_eq!(east.display_name, "East US");
    assert!(east.latitude.is_some());

    let by_id = client
        .region_by_id("/SUBSCRIPTIONS/SUB-1/LOCATIONS/WESTEUROPE")
        .await
        .unwrap();
    assert_eq!(by_id.name, "westeurope");

    assert_eq!(client.default_region().await.unwrap().name, "eastus");
    assert!(client.region("mars").await.unwrap_err().is_not_found());

    // Every lookup above reused the first discovery.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_regions_without_subscription_are_empty() {
    let server = MockServer::start().await;
    mount_subscriptions(&server).await;

    let client = create_client(&server, None);
    assert!(client.regions().await.unwrap().regions().is_empty());
    assert!(client.default_region().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_in_region_filters_by_location() {
    let server = MockServer::start().await;
    mount_locations(&server).await;
    mount_subscriptions(&server).await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-1/providers/Microsoft.Network/virtualNetworks"))
        .and(query_param("api-version", "2018-08-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"name": "vnet-east", "location": "eastus"},
                {"name": "vnet-west", "location": "westeurope"},
                {"name": "vnet-east2", "location": "eastus2"}
            ]
        })))
        .mount(&server)
        .await;

    let client = create_client(&server, Some("sub-1"));
    let east = client.region("eastus").await.unwrap();
    let networks: Vec<Value> = client
        .list_in_region(&east, Capability::Networks)
        .await
        .unwrap();

    assert_eq!(networks.len(), 1);
    assert_eq!(networks[0]["name"], "vnet-east");
}
