#[cfg(test)]
mod tests {
    use crate::{
        api,
        state::AppState,
        tests::{notifier_for, transfer, ScriptedLedger, ADDRESS_A, OTHER},
        watcher::BlockWatcher,
    };
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves the router on an ephemeral port and returns its base URL.
    async fn spawn_server(ledger: &Arc<ScriptedLedger>) -> (String, BlockWatcher) {
        let notifier = notifier_for(ledger);
        let watcher = BlockWatcher::new(notifier.clone(), Duration::from_millis(10));
        let app_state = Arc::new(AppState { notifier });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, api::create_router(app_state))
                .await
                .unwrap();
        });

        (format!("http://{}", addr), watcher)
    }

    #[tokio::test]
    async fn test_current_block_endpoint() {
        let ledger = ScriptedLedger::at_height(1466);
        let (base_url, _) = spawn_server(&ledger).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{}/currentBlock", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"data": {"block": 1466}}));

        ledger.set_height_unavailable(true);
        let response = client
            .get(format!("{}/currentBlock", base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_subscribe_endpoint() {
        let ledger = ScriptedLedger::at_height(100);
        let (base_url, _) = spawn_server(&ledger).await;
        let client = reqwest::Client::new();
        let url = format!("{}/subscribe", base_url);

        let response = client
            .post(&url)
            .json(&json!({"address": ADDRESS_A.to_uppercase().replacen("0X", "0x", 1)}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["address"], ADDRESS_A);
        assert_eq!(body["data"]["subscribed"], true);

        let response = client
            .post(&url)
            .json(&json!({"address": ADDRESS_A}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"]["subscribed"], false);

        let response = client
            .post(&url)
            .json(&json!({"address": "not-an-address"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = client
            .get(format!("{}/subscriptions", base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            body,
            json!({"data": [{"address": ADDRESS_A, "last_checked_block": 100}]})
        );
    }

    #[tokio::test]
    async fn test_transactions_endpoint_lifecycle() {
        let ledger = ScriptedLedger::at_height(100);
        let (base_url, watcher) = spawn_server(&ledger).await;
        let client = reqwest::Client::new();
        let transactions_url = format!("{}/transactions?address={}", base_url, ADDRESS_A);

        let response = client.get(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "never subscribed");

        client
            .post(format!("{}/subscribe", base_url))
            .json(&json!({"address": ADDRESS_A}))
            .send()
            .await
            .unwrap();

        let response = client.get(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-total-count"], "0");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"data": []}));

        let tx = transfer(OTHER, ADDRESS_A, "0x102");
        ledger.add_transaction(102, tx.clone());
        ledger.set_height(103);
        watcher.tick().await;

        let response = client.get(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-total-count"], "1");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["data"][0]["hash"], "0x102");
        assert_eq!(body["data"][0]["to"], ADDRESS_A);

        let response = client.delete(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = client.delete(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = client
            .delete(format!("{}/subscribe?address={}", base_url, ADDRESS_A))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = client.get(&transactions_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_transactions_endpoint_rejects_bad_address() {
        let ledger = ScriptedLedger::at_height(1);
        let (base_url, _) = spawn_server(&ledger).await;

        let response = reqwest::get(format!("{}/transactions?address=0x123", base_url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid address format");
    }

    #[tokio::test]
    async fn test_malformed_requests_return_json_errors() {
        let ledger = ScriptedLedger::at_height(1);
        let (base_url, _) = spawn_server(&ledger).await;
        let client = reqwest::Client::new();
        let subscribe_url = format!("{}/subscribe", base_url);

        let requests = [
            (
                "body is not JSON",
                client
                    .post(&subscribe_url)
                    .header("content-type", "application/json")
                    .body("{not json"),
            ),
            ("body without address", client.post(&subscribe_url).json(&json!({}))),
            (
                "body without content type",
                client.post(&subscribe_url).body(ADDRESS_A),
            ),
            (
                "transactions without address",
                client.get(format!("{}/transactions", base_url)),
            ),
            (
                "unsubscribe without address",
                client.delete(&subscribe_url),
            ),
        ];

        for (case, request) in requests {
            let response = request.send().await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", case);
            let body: Value = response.json().await.unwrap();
            assert!(body["error"].is_string(), "{}: {}", case, body);
        }
    }
}
