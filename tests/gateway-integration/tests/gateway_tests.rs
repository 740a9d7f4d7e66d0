//! End-to-end tests against a gateway listening on a real socket.

use serde_json::json;
use supplychain_common::{KeyValueStore, Lifecycle, ProductStatus};
use supplychain_gateway::{FileStore, Ledger};
use supplychain_gateway_integration::{product_body, TestGateway};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn supply_chain_scenario() {
    let gw = TestGateway::start(Ledger::in_memory()).await;

    let (status, _) = gw
        .post(
            "/addProduct",
            json!({
                "productID": "P100",
                "name": "Widget",
                "description": "desc",
                "manufacturingDate": "2024-01-01",
                "batchNumber": "B1"
            }),
        )
        .await;
    assert_eq!(status, 201);

    let (status, _) = gw
        .post(
            "/dispatchProduct",
            json!({"productID": "P100", "supplyDate": "2024-02-01", "warehouseLocation": "WH-East"}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, _) = gw
        .post(
            "/bulkPurchase",
            json!({"productID": "P100", "wholesaleDate": "2024-03-01",
                   "wholesaleLocation": "Region-5", "quantity": 50}),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = gw.fetch("P100").await;
    assert_eq!(status, 200);
    assert_eq!(
        body["result"],
        json!({
            "productID": "P100",
            "status": "Wholesaled",
            "supplyDate": "2024-02-01",
            "warehouseLocation": "WH-East",
            "wholesaleDate": "2024-03-01",
            "wholesaleLocation": "Region-5",
            "quantity": 50,
            "name": "Widget",
            "description": "desc",
            "manufacturingDate": "2024-01-01",
            "batchNumber": "B1"
        })
    );

    gw.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_one_product_are_serialized() {
    let ledger = Ledger::in_memory();
    let gw = TestGateway::start(ledger.clone()).await;
    let (status, _) = gw.post("/addProduct", product_body("P1", "Crate")).await;
    assert_eq!(status, 201);

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = gw.client.clone();
        let url = gw.url("/dispatchProduct");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({
                    "productID": "P1",
                    "supplyDate": format!("2024-02-{:02}", i + 1),
                    "warehouseLocation": format!("WH-{i}")
                }))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 200);
    }

    // Whichever write landed last, the record holds one complete pair.
    let mut session = ledger.connect().await;
    let product = Lifecycle::new(&mut *session).query("P1").unwrap();
    let date = product.supply_date.unwrap();
    let day: usize = date[8..].parse().unwrap();
    assert_eq!(product.warehouse_location.unwrap(), format!("WH-{}", day - 1));
    assert_eq!(product.status, ProductStatus::Supplied);
    drop(session);

    gw.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_products_proceed_independently() {
    let ledger = Ledger::in_memory();
    let gw = TestGateway::start(ledger.clone()).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = gw.client.clone();
        let url = gw.url("/addProduct");
        handles.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&product_body(&format!("P{i:03}"), "Item"))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 201);
    }

    let session = ledger.connect().await;
    assert_eq!(session.keys().unwrap().len(), 20);
    drop(session);

    gw.stop().await;
}

#[tokio::test]
async fn error_responses_carry_no_record() {
    let gw = TestGateway::start(Ledger::in_memory()).await;

    let (status, body) = gw.fetch("ghost").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["productID"], "ghost");
    assert!(body.get("result").is_none());

    let (status, body) = gw
        .post("/changeStatus", json!({"productID": "ghost", "status": "Sold"}))
        .await;
    assert_eq!(status, 404);
    assert!(body.get("result").is_none());

    let resp = gw
        .client
        .post(gw.url("/addProduct"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    gw.stop().await;
}

#[tokio::test]
async fn initializer_is_idempotent_over_http() {
    let gw = TestGateway::start(Ledger::in_memory()).await;

    let (status, body) = gw.post("/initLedger", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], json!(["P001", "P002"]));

    let (status, _) = gw
        .post("/changeStatus", json!({"productID": "P001", "status": "Recalled"}))
        .await;
    assert_eq!(status, 200);

    gw.post("/initLedger", json!({})).await;
    let (_, body) = gw.fetch("P001").await;
    assert_eq!(body["result"]["status"], "Created");
    assert_eq!(body["result"]["name"], "Product1");

    let resp = gw.client.get(gw.url("/health")).send().await.unwrap();
    let health: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(health["records"], 2);

    gw.stop().await;
}

#[tokio::test]
async fn file_ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.bin");

    let gw = TestGateway::start(Ledger::new(FileStore::open(&path).unwrap())).await;
    let (status, _) = gw.post("/addProduct", product_body("P500", "Pallet")).await;
    assert_eq!(status, 201);
    let (status, _) = gw
        .post("/processSale", json!({"productID": "P500", "buyerInfo": "Acme"}))
        .await;
    assert_eq!(status, 200);
    gw.stop().await;

    let gw = TestGateway::start(Ledger::new(FileStore::open(&path).unwrap())).await;
    let (status, body) = gw.fetch("P500").await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["status"], "Sold");
    assert_eq!(body["result"]["name"], "Pallet");
    gw.stop().await;
}
