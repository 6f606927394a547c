//! # Notification Dispatcher
//!
//! Fire-and-forget delivery of sale events to registered webhooks and
//! signals.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      dispatch_sale (post-commit)                        │
//! │                                                                         │
//! │  load active webhooks ─┐                                                │
//! │  load active signals ──┤                                                │
//! │                        ▼                                                │
//! │            build ONE immutable JSON payload                             │
//! │                        │                                                │
//! │        ┌───────────────┼───────────────┐                                │
//! │        ▼               ▼               ▼                                │
//! │   POST target A   POST target B   POST target C   (one task each)      │
//! │        │               │               │                                │
//! │     2xx→info!      non-2xx→warn!   timeout/refused→error!              │
//! │                                                                         │
//! │   NO retries. NO propagation. One target's failure never touches       │
//! │   another target or the already-committed sale.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//! Dispatch starts strictly after the sale transaction commits (the
//! orchestrator spawns this detached), so a target can never observe a sale
//! that later rolled back.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::dto::{CustomerSummary, StaffSummary};
use crate::error::ServiceResult;
use vela_core::{NotificationTarget, Sale, TargetAuth};
use vela_store::Store;

// =============================================================================
// Configuration
// =============================================================================

/// Dispatcher tuning knobs.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Per-request delivery timeout.
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Response-body truncation for warn-level delivery logs.
    /// Default: 200
    pub log_body_limit: usize,

    /// Response-body truncation for the operator test probe.
    /// Default: 500
    pub test_body_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            timeout: Duration::from_secs(10),
            log_body_limit: 200,
            test_body_limit: 500,
        }
    }
}

// =============================================================================
// Test Probe Outcome
// =============================================================================

/// Result of the operator "test this target" probe.
///
/// Unlike live dispatch this is synchronous and reports everything back to
/// the operator instead of the log.
#[derive(Debug, Clone, Serialize)]
pub struct TargetTestOutcome {
    pub success: bool,
    pub status_code: Option<u16>,
    /// Response body truncated to the configured test limit.
    pub response_body: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Delivers sale notifications to registered targets.
///
/// Cheap to clone; the reqwest client and pool are reference counted.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    client: Client,
    store: Store,
    config: DispatchConfig,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with default config.
    pub fn new(store: Store) -> Self {
        Self::with_config(store, DispatchConfig::default())
    }

    /// Creates a dispatcher with explicit config (tests shrink the timeout).
    pub fn with_config(store: Store, config: DispatchConfig) -> Self {
        NotificationDispatcher {
            client: Client::new(),
            store,
            config,
        }
    }

    /// Notifies every active webhook and signal about a committed sale.
    ///
    /// Intended to run as a detached task. Never returns an error to the
    /// sale path; delivery problems end up in the log and nowhere else.
    pub async fn dispatch_sale(
        &self,
        sale: Sale,
        customer: CustomerSummary,
        staff: StaffSummary,
    ) {
        let targets = match self.load_active_targets().await {
            Ok(targets) => targets,
            Err(err) => {
                error!(sale_id = %sale.id, error = %err, "Failed to load notification targets");
                return;
            }
        };

        if targets.is_empty() {
            info!(sale_id = %sale.id, "No active notification targets");
            return;
        }

        // One payload, built once, shared by every target.
        let payload = build_sale_payload(&sale, &customer, &staff);

        let mut deliveries = Vec::with_capacity(targets.len());
        for target in targets {
            let client = self.client.clone();
            let config = self.config.clone();
            let payload = payload.clone();

            deliveries.push(tokio::spawn(async move {
                deliver(&client, &config, &target, &payload).await;
            }));
        }

        // The deliveries already run concurrently; awaiting the handles only
        // keeps this task alive until the last one settles.
        for handle in deliveries {
            let _ = handle.await;
        }
    }

    /// Operator probe: POST a synthetic sale payload to one target and
    /// report what happened.
    pub async fn test_target(&self, target: &NotificationTarget) -> TargetTestOutcome {
        let payload = sample_payload();

        let request = apply_auth(
            self.client
                .post(&target.url)
                .timeout(self.config.timeout)
                .json(&payload),
            &target.auth,
        );

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();

                TargetTestOutcome {
                    success: status.is_success(),
                    status_code: Some(status.as_u16()),
                    response_body: Some(truncate(&body, self.config.test_body_limit)),
                    error: None,
                }
            }
            Err(err) if err.is_timeout() => TargetTestOutcome {
                success: false,
                status_code: None,
                response_body: None,
                error: Some(format!(
                    "Request timed out ({} seconds)",
                    self.config.timeout.as_secs()
                )),
            },
            Err(err) => TargetTestOutcome {
                success: false,
                status_code: None,
                response_body: None,
                error: Some(format!("Request error: {err}")),
            },
        }
    }

    /// Loads active webhooks and signals - two independent registries,
    /// concatenated for delivery.
    async fn load_active_targets(&self) -> ServiceResult<Vec<NotificationTarget>> {
        let mut targets = self.store.webhooks().list_active().await?;
        targets.extend(self.store.signals().list_active().await?);
        Ok(targets)
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// POSTs the payload to one target. All outcomes terminate here.
async fn deliver(
    client: &Client,
    config: &DispatchConfig,
    target: &NotificationTarget,
    payload: &serde_json::Value,
) {
    let request = apply_auth(
        client
            .post(&target.url)
            .timeout(config.timeout)
            .json(payload),
        &target.auth,
    );

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            info!(
                kind = target.kind.label(),
                name = %target.name,
                id = %target.id,
                status = response.status().as_u16(),
                "Notification delivered"
            );
        }
        Ok(response) => {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(
                kind = target.kind.label(),
                name = %target.name,
                id = %target.id,
                status,
                body = %truncate(&body, config.log_body_limit),
                "Notification rejected by target"
            );
        }
        Err(err) if err.is_timeout() => {
            error!(
                kind = target.kind.label(),
                name = %target.name,
                id = %target.id,
                "Notification timed out"
            );
        }
        Err(err) => {
            error!(
                kind = target.kind.label(),
                name = %target.name,
                id = %target.id,
                error = %err,
                "Notification request error"
            );
        }
    }
}

/// Applies a target's auth config to an outgoing request.
fn apply_auth(builder: reqwest::RequestBuilder, auth: &TargetAuth) -> reqwest::RequestBuilder {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    match auth {
        TargetAuth::None => builder,
        TargetAuth::Bearer { token } => builder.header("Authorization", format!("Bearer {token}")),
        TargetAuth::Apikey { header, token } => builder.header(header, token),
        TargetAuth::Basic { username, password } => {
            let credentials = STANDARD.encode(format!("{username}:{password}"));
            builder.header("Authorization", format!("Basic {credentials}"))
        }
    }
}

/// Truncates on a char boundary (bodies may be arbitrary UTF-8).
fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

// =============================================================================
// Payloads
// =============================================================================

/// Builds the sale notification payload. Decimals render as strings,
/// `created_at` as RFC 3339.
pub fn build_sale_payload(
    sale: &Sale,
    customer: &CustomerSummary,
    staff: &StaffSummary,
) -> serde_json::Value {
    json!({
        "sale_id": sale.id,
        "customer": {
            "id": customer.id,
            "phone": customer.phone,
            "name": customer.name,
            "loyalty_points": customer.loyalty_points,
        },
        "staff": {
            "id": staff.id,
            "name": staff.name,
        },
        "items": sale.items,
        "subtotal": sale.subtotal,
        "discount_amount": sale.discount_amount,
        "total_amount": sale.total_amount,
        "loyalty_points_generated": sale.loyalty_points_generated,
        "payment_methods": sale.payment_methods,
        "created_at": sale.created_at.to_rfc3339(),
    })
}

/// Synthetic payload for the operator test probe. Same shape as a live
/// notification so receivers can validate their parsing.
fn sample_payload() -> serde_json::Value {
    json!({
        "sale_id": "sale_test123456",
        "customer": {
            "id": "customer_test123",
            "phone": "5551234567",
            "name": "Test Customer",
            "loyalty_points": "100.00",
        },
        "staff": {
            "id": "staff_test123",
            "name": "Test Staff",
        },
        "items": [
            {
                "type": "product",
                "product_id": "product_test123",
                "name": "Test Product",
                "description": "Test product description",
                "unit_price": "50.00",
                "quantity": 2,
                "total": "100.00"
            }
        ],
        "subtotal": "100.00",
        "discount_amount": "10.00",
        "total_amount": "90.00",
        "loyalty_points_generated": 9,
        "payment_methods": [
            {
                "method": "cash",
                "amount": "90.00",
                "reference": null
            }
        ],
        "created_at": Utc::now().to_rfc3339(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use vela_core::{PaymentAllocation, PaymentMethod, TargetKind};
    use vela_store::{DbConfig, Store};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// Minimal HTTP responder: answers every connection with a fixed status
    /// and body, counting hits. Enough protocol for reqwest to parse.
    async fn spawn_responder(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                hits_clone.fetch_add(1, Ordering::SeqCst);

                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        (format!("http://{addr}/"), hits)
    }

    /// Responder that accepts connections but never answers.
    async fn spawn_black_hole() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        format!("http://{addr}/")
    }

    fn sale_fixture() -> (Sale, CustomerSummary, StaffSummary) {
        let now = Utc::now();
        let sale = Sale {
            id: "sale_ab12cd34ef".to_string(),
            customer_id: "customer_ab12cd34ef".to_string(),
            staff_id: "staff_ab12cd34ef".to_string(),
            items: vec![],
            subtotal: dec!(20.00),
            discount_amount: dec!(2.00),
            total_amount: dec!(18.00),
            loyalty_points_generated: 18,
            payment_methods: vec![PaymentAllocation {
                method: PaymentMethod::Cash,
                amount: dec!(18.00),
                reference: None,
            }],
            created_at: now,
            updated_at: now,
        };
        let customer = CustomerSummary {
            id: sale.customer_id.clone(),
            phone: "5551234567".to_string(),
            name: Some("Ana".to_string()),
            loyalty_points: dec!(68.00),
        };
        let staff = StaffSummary {
            id: sale.staff_id.clone(),
            name: "Luis".to_string(),
        };
        (sale, customer, staff)
    }

    fn target(id: &str, kind: TargetKind, url: &str, auth: TargetAuth) -> NotificationTarget {
        let now = Utc::now();
        NotificationTarget {
            id: id.to_string(),
            kind,
            name: "Bridge".to_string(),
            url: url.to_string(),
            is_active: true,
            auth,
            created_at: now,
            updated_at: now,
        }
    }

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            timeout: Duration::from_millis(300),
            ..DispatchConfig::default()
        }
    }

    #[test]
    fn test_payload_shape() {
        let (sale, customer, staff) = sale_fixture();
        let payload = build_sale_payload(&sale, &customer, &staff);

        assert_eq!(payload["sale_id"], "sale_ab12cd34ef");
        assert_eq!(payload["total_amount"], "18.00");
        assert_eq!(payload["customer"]["loyalty_points"], "68.00");
        assert_eq!(payload["loyalty_points_generated"], 18);
        assert_eq!(payload["payment_methods"][0]["method"], "cash");
        // RFC 3339 timestamp
        assert!(payload["created_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_basic_auth_encoding() {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        assert_eq!(STANDARD.encode("user:pass"), "dXNlcjpwYXNz");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("short", 200), "short");
    }

    #[tokio::test]
    async fn test_probe_reports_success() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let dispatcher = NotificationDispatcher::with_config(store, fast_config());

        let (url, hits) = spawn_responder(200, "ok").await;
        let target = target("webhook_0000000001", TargetKind::Webhook, &url, TargetAuth::None);

        let outcome = dispatcher.test_target(&target).await;
        assert!(outcome.success);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.response_body.as_deref(), Some("ok"));
        assert!(outcome.error.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_probe_reports_rejection_with_truncated_body() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let mut config = fast_config();
        config.test_body_limit = 4;
        let dispatcher = NotificationDispatcher::with_config(store, config);

        let (url, _) = spawn_responder(422, "unprocessable entity").await;
        let target = target("webhook_0000000001", TargetKind::Webhook, &url, TargetAuth::None);

        let outcome = dispatcher.test_target(&target).await;
        assert!(!outcome.success);
        assert_eq!(outcome.status_code, Some(422));
        assert_eq!(outcome.response_body.as_deref(), Some("unpr"));
    }

    #[tokio::test]
    async fn test_probe_reports_timeout() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let dispatcher = NotificationDispatcher::with_config(store, fast_config());

        let url = spawn_black_hole().await;
        let target = target("signal_0000000001", TargetKind::Signal, &url, TargetAuth::None);

        let outcome = dispatcher.test_target(&target).await;
        assert!(!outcome.success);
        assert!(outcome.status_code.is_none());
        assert!(outcome.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_dispatch_isolates_failing_targets() {
        init_tracing();
        let store = Store::new(DbConfig::in_memory()).await.unwrap();

        // One healthy webhook, one black-hole signal.
        let (healthy_url, hits) = spawn_responder(200, "ok").await;
        let dead_url = spawn_black_hole().await;

        store
            .webhooks()
            .insert(&target(
                "webhook_0000000001",
                TargetKind::Webhook,
                &healthy_url,
                TargetAuth::None,
            ))
            .await
            .unwrap();
        store
            .signals()
            .insert(&target(
                "signal_0000000001",
                TargetKind::Signal,
                &dead_url,
                TargetAuth::None,
            ))
            .await
            .unwrap();

        let dispatcher = NotificationDispatcher::with_config(store, fast_config());
        let (sale, customer, staff) = sale_fixture();

        // Must complete despite the dead target, and the healthy one got hit.
        dispatcher.dispatch_sale(sale, customer, staff).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_with_no_targets_is_a_noop() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let dispatcher = NotificationDispatcher::with_config(store, fast_config());
        let (sale, customer, staff) = sale_fixture();

        dispatcher.dispatch_sale(sale, customer, staff).await;
    }
}
