use crate::api_client::ApiClient;
use crate::output::TestResult;
use crate::sse_client::Connection;
use anyhow::Result;
use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect and verify the handshake: the first frame must be a `connected`
/// event whose id also shows up in the connection listing.
pub async fn connection_test(base_url: &str, api: &ApiClient) -> Result<TestResult> {
    let mut connection = Connection::establish(base_url, "conn-test".to_string()).await?;
    let connection_id = connection.wait_for_connection_id(EVENT_TIMEOUT).await?;

    let listing = api.list_connections().await?;
    let listed = listing["connections"]
        .as_array()
        .map(|connections| {
            connections
                .iter()
                .any(|entry| entry["connectionId"] == connection_id.as_str())
        })
        .unwrap_or(false);

    Ok(TestResult {
        name: "connection".to_string(),
        passed: listed,
        detail: format!("connected as {connection_id}, listed={listed}"),
    })
}

/// Broadcast to two live connections and verify both receive the payload and
/// the response counts add up.
pub async fn broadcast_test(base_url: &str, api: &ApiClient) -> Result<TestResult> {
    let mut first = Connection::establish(base_url, "broadcast-1".to_string()).await?;
    let mut second = Connection::establish(base_url, "broadcast-2".to_string()).await?;
    first.wait_for_connection_id(EVENT_TIMEOUT).await?;
    second.wait_for_connection_id(EVENT_TIMEOUT).await?;

    let response = api.broadcast("broadcast payload", Some("scenario")).await?;
    let sent_to = response["sentTo"].as_u64().unwrap_or(0);

    let first_event = first.wait_for_event("scenario", EVENT_TIMEOUT).await?;
    let second_event = second.wait_for_event("scenario", EVENT_TIMEOUT).await?;

    let passed = sent_to >= 2
        && first_event.data["content"] == "broadcast payload"
        && second_event.data["content"] == "broadcast payload";

    Ok(TestResult {
        name: "broadcast".to_string(),
        passed,
        detail: format!("sentTo={sent_to}, both clients received the payload: {passed}"),
    })
}

/// Unicast to one of two connections; the other must stay quiet. An unknown
/// id must produce the 422 not-found body.
pub async fn unicast_test(base_url: &str, api: &ApiClient) -> Result<TestResult> {
    let mut target = Connection::establish(base_url, "unicast-target".to_string()).await?;
    let mut bystander = Connection::establish(base_url, "unicast-bystander".to_string()).await?;
    let target_id = target.wait_for_connection_id(EVENT_TIMEOUT).await?;
    bystander.wait_for_connection_id(EVENT_TIMEOUT).await?;

    let (status, body) = api.send_to(&target_id, "direct hit", Some("direct")).await?;
    let delivered = status.is_success() && body["connectionId"] == target_id.as_str();

    let event = target.wait_for_event("direct", EVENT_TIMEOUT).await?;
    let received = event.data["content"] == "direct hit";

    let bystander_quiet = bystander
        .wait_for_event("direct", Duration::from_millis(500))
        .await
        .is_err();

    let (missing_status, missing_body) = api.send_to("nonexistent", "x", None).await?;
    let not_found_handled = missing_status.as_u16() == 422
        && missing_body["error"]["message"] == "Connection not found";

    let passed = delivered && received && bystander_quiet && not_found_handled;
    Ok(TestResult {
        name: "unicast".to_string(),
        passed,
        detail: format!(
            "delivered={delivered}, received={received}, bystander_quiet={bystander_quiet}, \
             not_found_handled={not_found_handled}"
        ),
    })
}

/// Sever one of three transports out-of-band, broadcast, and verify the
/// survivors receive the event while the listing drops the dead connection.
pub async fn dead_connection_test(base_url: &str, api: &ApiClient) -> Result<TestResult> {
    let mut a = Connection::establish(base_url, "dead-a".to_string()).await?;
    let mut b = Connection::establish(base_url, "dead-b".to_string()).await?;
    let mut c = Connection::establish(base_url, "dead-c".to_string()).await?;
    a.wait_for_connection_id(EVENT_TIMEOUT).await?;
    let b_id = b.wait_for_connection_id(EVENT_TIMEOUT).await?;
    c.wait_for_connection_id(EVENT_TIMEOUT).await?;

    b.sever();
    // Give the server a moment to observe the closed transport.
    tokio::time::sleep(Duration::from_millis(500)).await;

    api.broadcast("are you alive", Some("liveness")).await?;

    let a_received = a.wait_for_event("liveness", EVENT_TIMEOUT).await.is_ok();
    let c_received = c.wait_for_event("liveness", EVENT_TIMEOUT).await.is_ok();

    // The dead connection may take one more delivery attempt to be reaped.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let listing = api.list_connections().await?;
    let b_listed = listing["connections"]
        .as_array()
        .map(|connections| {
            connections
                .iter()
                .any(|entry| entry["connectionId"] == b_id.as_str())
        })
        .unwrap_or(true);

    let passed = a_received && c_received && !b_listed;
    Ok(TestResult {
        name: "dead-connection".to_string(),
        passed,
        detail: format!(
            "survivors_received={}, dead_connection_reaped={}",
            a_received && c_received,
            !b_listed
        ),
    })
}
