//! Shared harness: a server on an ephemeral port plus request helpers.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use welfare_ledger::api;
use welfare_ledger::app_state::AppState;
use welfare_ledger::domain::{EventBus, Ledger};
use welfare_ledger::service::UsdRate;

/// Native-token price used by every test server.
pub const USD_PER_UNIT: f64 = 2000.0;
/// Wallet given to welfare accounts.
pub const WALLET: &str = "0x2222222222222222222222222222222222222222";

/// Running server plus a client that speaks to it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

/// Identity of a registered account.
#[derive(Clone, Copy)]
pub struct Identity {
    pub id: uuid::Uuid,
    pub role: &'static str,
}

impl TestServer {
    pub async fn start() -> Self {
        let Ok(rate) = UsdRate::new(USD_PER_UNIT) else {
            panic!("rate rejected");
        };
        let state = AppState::new(Arc::new(Ledger::new()), EventBus::new(256), rate, 30.0);
        let app = api::build_app(state, Duration::from_secs(10));
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            addr,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Sends a request as `who` (anonymous if `None`) and returns the
    /// status and the JSON body (`Null` if empty).
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        who: Option<Identity>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(who) = who {
            req = req
                .header("x-user-id", who.id.to_string())
                .header("x-user-role", who.role);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let Ok(resp) = req.send().await else {
            panic!("request to {path} failed");
        };
        let status = resp.status().as_u16();
        let value = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn register(&self, role: &'static str, with_wallet: bool) -> Identity {
        let mut body = json!({
            "role": role,
            "name": format!("{role} account"),
            "email": format!("{}@example.org", uuid::Uuid::new_v4()),
        });
        if with_wallet {
            body["blockchain_address"] = json!(WALLET);
        }
        let (status, account) = self
            .send(reqwest::Method::POST, "/api/v1/users", None, Some(body))
            .await;
        assert_eq!(status, 201, "registration failed: {account}");
        let Some(Ok(id)) = account["id"].as_str().map(str::parse::<uuid::Uuid>) else {
            panic!("account without id: {account}");
        };
        Identity { id, role }
    }
}

/// Unique, well-formed transaction hash.
pub fn tx_hash() -> String {
    format!(
        "0x{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Extracts a string field, panicking with the body when absent.
pub fn field(value: &Value, key: &str) -> String {
    let Some(s) = value[key].as_str() else {
        panic!("missing {key} in {value}");
    };
    s.to_string()
}
