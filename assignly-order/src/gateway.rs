use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the hosted gateway needs to open a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Amount in minor currency units (kobo). Always the freshly recomputed
    /// total, never a value carried over from an earlier step.
    pub amount_minor: i64,
    pub currency: String,
    /// Unique per attempt, for reconciliation on the gateway side.
    pub reference: String,
    /// Mirror of the work request for the gateway dashboard.
    pub metadata: serde_json::Value,
}

/// The single tagged completion of a gateway session. The hosted UI resolves
/// to exactly one of these, never both, never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Completed { transaction_id: String },
    Cancelled,
}

/// Confirmed payment attached to a paid order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentResult {
    pub success: bool,
    pub transaction_id: String,
    pub amount_minor: i64,
    pub timestamp: DateTime<Utc>,
}

/// Opaque capability over the hosted payment provider (Paystack in
/// production). The provider's own protocol is not modelled here.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session and suspend until the customer either
    /// completes or closes it.
    async fn open_session(&self, request: SessionRequest) -> GatewayOutcome;
}

/// Scripted gateway for tests. Records every opened session so assertions can
/// inspect the amount, reference and metadata actually sent.
pub struct MockGateway {
    outcomes: std::sync::Mutex<Vec<GatewayOutcome>>,
    pub sessions: std::sync::Mutex<Vec<SessionRequest>>,
}

impl MockGateway {
    /// Outcomes are consumed in order, one per `open_session` call.
    pub fn scripted(outcomes: Vec<GatewayOutcome>) -> Self {
        Self {
            outcomes: std::sync::Mutex::new(outcomes),
            sessions: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn always_completes() -> Self {
        Self::scripted(vec![])
    }

    pub fn recorded_sessions(&self) -> Vec<SessionRequest> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn open_session(&self, request: SessionRequest) -> GatewayOutcome {
        let reference = request.reference.clone();
        self.sessions.lock().unwrap().push(request);

        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            GatewayOutcome::Completed {
                transaction_id: format!("mock_txn_{}", reference),
            }
        } else {
            outcomes.remove(0)
        }
    }
}
