use assignly_pricing::{PricingEngine, PricingError};
use assignly_shared::{ValidationErrors, WorkRequest};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::{RequestService, SubmitError};
use crate::gateway::{GatewayOutcome, PaymentGateway, PaymentResult, SessionRequest};
use crate::session::{CheckoutState, OrderError, OrderSession};

/// Drives an order from draft through submission and payment.
///
/// Both collaborators sit behind traits; production wires the HTTP backend
/// client and the Paystack adapter, tests wire the mocks.
pub struct CheckoutOrchestrator {
    engine: PricingEngine,
    backend: Arc<dyn RequestService>,
    gateway: Arc<dyn PaymentGateway>,
    /// The deployment's single supported currency, e.g. "NGN".
    currency: String,
}

/// How a payment attempt resolved. Cancellation is a normal outcome, not an
/// error: the order stays submitted and the user may retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentFlow {
    Completed(PaymentResult),
    Cancelled,
}

impl CheckoutOrchestrator {
    pub fn new(
        engine: PricingEngine,
        backend: Arc<dyn RequestService>,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
    ) -> Self {
        Self {
            engine,
            backend,
            gateway,
            currency,
        }
    }

    /// Drafting → Submitted: price the draft and register it with the
    /// backend. On any transport error the session stays in Drafting so the
    /// user can retry.
    pub async fn submit(
        &self,
        session: &mut OrderSession,
        now: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        if session.state() != CheckoutState::Drafting {
            return Err(OrderError::InvalidTransition {
                from: session.state(),
                to: CheckoutState::Submitted,
            }
            .into());
        }
        let request = session.request().ok_or(OrderError::NoOrder)?.clone();

        let pricing = self.price(&request, now)?;
        let request_id = self.backend.create_request(&request).await?;

        tracing::info!(%request_id, total_minor = pricing.total_minor, "Request accepted by backend");
        session.attach_submission(pricing, request_id)?;
        Ok(())
    }

    /// Submitted → PaymentPending → {Paid | Submitted}. The price is always
    /// recomputed against the current request and `now` before the gateway
    /// session opens; an amount carried over from an earlier step is never
    /// charged.
    pub async fn initiate_payment(
        &self,
        session: &mut OrderSession,
        now: DateTime<Utc>,
    ) -> Result<PaymentFlow, CheckoutError> {
        let request = session.request().ok_or(OrderError::NoOrder)?.clone();

        let pricing = self.price(&request, now)?;
        session.reprice(pricing.clone())?;
        session.begin_payment()?;

        let reference = new_payment_reference(now);
        tracing::info!(
            %reference,
            amount_minor = pricing.total_minor,
            "Opening payment session"
        );

        let outcome = self
            .gateway
            .open_session(SessionRequest {
                amount_minor: pricing.total_minor,
                currency: self.currency.clone(),
                reference,
                metadata: request_metadata(&request),
            })
            .await;

        match outcome {
            GatewayOutcome::Completed { transaction_id } => {
                let payment = PaymentResult {
                    success: true,
                    transaction_id,
                    amount_minor: pricing.total_minor,
                    timestamp: now,
                };
                session.complete_payment(payment.clone())?;
                tracing::info!(
                    transaction_id = %payment.transaction_id,
                    "Payment confirmed, order paid"
                );
                Ok(PaymentFlow::Completed(payment))
            }
            GatewayOutcome::Cancelled => {
                session.cancel_payment()?;
                tracing::info!("Payment session closed without completing, order kept for retry");
                Ok(PaymentFlow::Cancelled)
            }
        }
    }

    fn price(
        &self,
        request: &WorkRequest,
        now: DateTime<Utc>,
    ) -> Result<assignly_pricing::PricingResult, CheckoutError> {
        self.engine.compute(request, now).map_err(|error| {
            // Broken rate table, not user error. Surface loudly.
            tracing::error!(%error, "Pricing configuration error");
            CheckoutError::Pricing(error)
        })
    }
}

/// Unique per payment attempt. Format: ASGN-{unix seconds}-{short uuid}.
fn new_payment_reference(now: DateTime<Utc>) -> String {
    let short_id = &Uuid::new_v4().simple().to_string()[..8];
    format!("ASGN-{}-{}", now.timestamp(), short_id.to_uppercase())
}

/// Descriptive metadata mirrored onto the gateway session for reconciliation.
fn request_metadata(request: &WorkRequest) -> serde_json::Value {
    serde_json::json!({
        "full_name": request.full_name,
        "phone": request.phone,
        "work_type": request.work_type,
        "page_count": request.page_count,
        "diagram_count": request.diagram_count,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Fatal: the configured rate table cannot price this order.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Recoverable transport failure talking to the backend.
    #[error(transparent)]
    Submission(#[from] SubmitError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockRequestService;
    use crate::gateway::MockGateway;
    use crate::session::CheckoutState;
    use assignly_pricing::PricingConfig;
    use assignly_shared::{DeliveryType, WorkType};
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn request(days_out: i64) -> WorkRequest {
        WorkRequest {
            full_name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+2348012345678".to_string(),
            department: "Computer Science".to_string(),
            level: "300".to_string(),
            course_of_study: "CSC".to_string(),
            work_type: WorkType::Assignment,
            deadline: fixed_now() + Duration::days(days_out),
            notes: String::new(),
            files: vec![],
            page_count: 5,
            diagram_count: 0,
            delivery_type: DeliveryType::SoftCopy,
        }
    }

    fn orchestrator(
        gateway: Arc<MockGateway>,
        backend: Arc<dyn RequestService>,
    ) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            PricingEngine::new(PricingConfig::default()),
            backend,
            gateway,
            "NGN".to_string(),
        )
    }

    #[tokio::test]
    async fn test_happy_path_ends_paid() {
        let gateway = Arc::new(MockGateway::always_completes());
        let orch = orchestrator(gateway.clone(), Arc::new(MockRequestService::accepting()));

        let mut session = OrderSession::new();
        session.start_request(request(20)).unwrap();

        orch.submit(&mut session, fixed_now()).await.unwrap();
        assert_eq!(session.state(), CheckoutState::Submitted);
        assert_eq!(session.pricing().unwrap().total_minor, 5 * 20_000);

        let flow = orch.initiate_payment(&mut session, fixed_now()).await.unwrap();
        assert!(matches!(flow, PaymentFlow::Completed(_)));
        assert_eq!(session.state(), CheckoutState::Paid);
        // The whole flow runs off the injected clock.
        assert_eq!(session.payment().unwrap().timestamp, fixed_now());

        // The gateway was asked for exactly the recomputed total.
        let sessions = gateway.recorded_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].amount_minor, 5 * 20_000);
        assert_eq!(sessions[0].currency, "NGN");
        assert_eq!(sessions[0].metadata["work_type"], "assignment");
        assert_eq!(sessions[0].metadata["page_count"], 5);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_session_drafting() {
        let gateway = Arc::new(MockGateway::always_completes());
        let orch = orchestrator(
            gateway,
            Arc::new(MockRequestService::failing(SubmitError::Server)),
        );

        let mut session = OrderSession::new();
        session.start_request(request(20)).unwrap();

        let error = orch.submit(&mut session, fixed_now()).await.unwrap_err();
        assert!(matches!(error, CheckoutError::Submission(SubmitError::Server)));
        assert_eq!(session.state(), CheckoutState::Drafting);
        assert!(session.request_id().is_none());
    }

    #[tokio::test]
    async fn test_cancel_then_retry_recomputes_against_current_clock() {
        let gateway = Arc::new(MockGateway::scripted(vec![GatewayOutcome::Cancelled]));
        let orch = orchestrator(gateway.clone(), Arc::new(MockRequestService::accepting()));

        // Deadline 10 days from the first attempt.
        let mut session = OrderSession::new();
        session.start_request(request(10)).unwrap();
        orch.submit(&mut session, fixed_now()).await.unwrap();

        let flow = orch.initiate_payment(&mut session, fixed_now()).await.unwrap();
        assert_eq!(flow, PaymentFlow::Cancelled);
        assert_eq!(session.state(), CheckoutState::Submitted);
        assert_eq!(session.pricing().unwrap().total_minor, 5 * 20_000);

        // Retry nine days later: the deadline is now impromptu-close, so the
        // recomputed amount must include the fee.
        let later = fixed_now() + Duration::days(9);
        let flow = orch.initiate_payment(&mut session, later).await.unwrap();
        assert!(matches!(flow, PaymentFlow::Completed(_)));
        assert_eq!(session.state(), CheckoutState::Paid);

        let sessions = gateway.recorded_sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].amount_minor, 5 * 20_000);
        assert_eq!(sessions[1].amount_minor, 5 * 20_000 + 50_000);
        assert_ne!(sessions[0].reference, sessions[1].reference);
    }

    #[tokio::test]
    async fn test_initiate_while_pending_is_rejected_without_side_effects() {
        let gateway = Arc::new(MockGateway::always_completes());
        let orch = orchestrator(gateway.clone(), Arc::new(MockRequestService::accepting()));

        let mut session = OrderSession::new();
        session.start_request(request(20)).unwrap();
        orch.submit(&mut session, fixed_now()).await.unwrap();
        session.begin_payment().unwrap();

        let error = orch.initiate_payment(&mut session, fixed_now()).await.unwrap_err();
        assert!(matches!(
            error,
            CheckoutError::Order(OrderError::InvalidTransition { .. })
        ));
        assert_eq!(session.state(), CheckoutState::PaymentPending);
        assert!(gateway.recorded_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_work_type_is_fatal_before_any_network_call() {
        let mut config = PricingConfig::default();
        config.base_fees.remove(&WorkType::Assignment);
        let gateway = Arc::new(MockGateway::always_completes());
        let orch = CheckoutOrchestrator::new(
            PricingEngine::new(config),
            Arc::new(MockRequestService::accepting()),
            gateway.clone(),
            "NGN".to_string(),
        );

        let mut session = OrderSession::new();
        session.start_request(request(20)).unwrap();

        let error = orch.submit(&mut session, fixed_now()).await.unwrap_err();
        assert!(matches!(error, CheckoutError::Pricing(_)));
        assert_eq!(session.state(), CheckoutState::Drafting);
        assert!(gateway.recorded_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_payment_amount_matches_displayed_total() {
        let gateway = Arc::new(MockGateway::always_completes());
        let orch = orchestrator(gateway.clone(), Arc::new(MockRequestService::accepting()));

        let mut session = OrderSession::new();
        let mut req = request(1); // impromptu deadline
        req.work_type = WorkType::Project;
        req.page_count = 10;
        req.diagram_count = 3;
        req.delivery_type = DeliveryType::PrintedSpiral;
        session.start_request(req).unwrap();
        orch.submit(&mut session, fixed_now()).await.unwrap();

        orch.initiate_payment(&mut session, fixed_now()).await.unwrap();

        let displayed = session.pricing().unwrap();
        let sum: i64 = displayed.breakdown.iter().map(|l| l.amount_minor).sum();
        let charged = gateway.recorded_sessions()[0].amount_minor;
        assert_eq!(displayed.total_minor, sum);
        assert_eq!(charged, displayed.total_minor);
        assert_eq!(session.payment().unwrap().amount_minor, charged);
    }
}
