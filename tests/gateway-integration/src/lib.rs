//! Helpers for driving a live gateway over HTTP.

use serde_json::Value;
use supplychain_gateway::Ledger;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A gateway serving on an ephemeral local port.
pub struct TestGateway {
    pub base_url: String,
    pub client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestGateway {
    /// Start a gateway over `ledger` on 127.0.0.1 with an OS-assigned port.
    pub async fn start(ledger: Ledger) -> Self {
        tracing_subscriber::fmt::try_init().ok();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(supplychain_gateway::serve(listener, ledger, async move {
            rx.await.ok();
        }));

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body, returning the status code and parsed response body.
    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path} failed: {e}"));
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// GET /fetchProduct for `id`.
    pub async fn fetch(&self, id: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(self.url("/fetchProduct"))
            .query(&[("productID", id)])
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET /fetchProduct failed: {e}"));
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// Stop the server and wait for it to finish in-flight requests.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        if let Some(task) = self.task.take() {
            task.await
                .expect("gateway task panicked")
                .expect("gateway server error");
        }
    }
}

/// Creation body for a product with the given id.
pub fn product_body(id: &str, name: &str) -> Value {
    serde_json::json!({
        "productID": id,
        "name": name,
        "description": format!("{name} description"),
        "manufacturingDate": "2024-01-01",
        "batchNumber": "B1"
    })
}
