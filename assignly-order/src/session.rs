use assignly_pricing::PricingResult;
use assignly_shared::{ValidationErrors, WorkRequest};
use serde::{Deserialize, Serialize};

use crate::gateway::PaymentResult;

/// Checkout lifecycle state for the one live order in a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutState {
    Empty,
    Drafting,
    Submitted,
    PaymentPending,
    Paid,
}

/// The one live order for a session and its lifecycle state.
///
/// Explicitly scoped and passed by the caller; there is no process-wide
/// instance. Exactly one writer at a time is guaranteed by `&mut self` plus
/// the transition guards, so no locking is needed. Starting a new request
/// discards whatever came before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSession {
    request: Option<WorkRequest>,
    pricing: Option<PricingResult>,
    request_id: Option<String>,
    payment: Option<PaymentResult>,
    state: CheckoutState,
}

impl OrderSession {
    pub fn new() -> Self {
        Self {
            request: None,
            pricing: None,
            request_id: None,
            payment: None,
            state: CheckoutState::Empty,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn request(&self) -> Option<&WorkRequest> {
        self.request.as_ref()
    }

    pub fn pricing(&self) -> Option<&PricingResult> {
        self.pricing.as_ref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn payment(&self) -> Option<&PaymentResult> {
        self.payment.as_ref()
    }

    /// Begin drafting a new order from an intake candidate. Any prior order,
    /// whatever its state, is discarded.
    pub fn start_request(&mut self, request: WorkRequest) -> Result<(), ValidationErrors> {
        request.validate()?;
        *self = Self::new();
        self.request = Some(request);
        self.state = CheckoutState::Drafting;
        Ok(())
    }

    /// Drafting → Submitted, once the backend has accepted the request and a
    /// price has been computed.
    pub fn attach_submission(
        &mut self,
        pricing: PricingResult,
        request_id: String,
    ) -> Result<(), OrderError> {
        self.guard(CheckoutState::Drafting, CheckoutState::Submitted)?;
        self.pricing = Some(pricing);
        self.request_id = Some(request_id);
        self.state = CheckoutState::Submitted;
        Ok(())
    }

    /// Submitted → PaymentPending. A second call while a gateway session is
    /// already open is rejected with no side effects.
    pub fn begin_payment(&mut self) -> Result<(), OrderError> {
        self.guard(CheckoutState::Submitted, CheckoutState::PaymentPending)?;
        self.state = CheckoutState::PaymentPending;
        Ok(())
    }

    /// Replace the stored quote. Only legal before payment has started.
    pub fn reprice(&mut self, pricing: PricingResult) -> Result<(), OrderError> {
        if self.state != CheckoutState::Submitted {
            return Err(OrderError::InvalidTransition {
                from: self.state,
                to: CheckoutState::Submitted,
            });
        }
        self.pricing = Some(pricing);
        Ok(())
    }

    /// PaymentPending → Paid. Terminal.
    pub fn complete_payment(&mut self, payment: PaymentResult) -> Result<(), OrderError> {
        self.guard(CheckoutState::PaymentPending, CheckoutState::Paid)?;
        self.payment = Some(payment);
        self.state = CheckoutState::Paid;
        Ok(())
    }

    /// PaymentPending → Submitted. The gateway session closed without
    /// completing; order, pricing and request id stay intact for a retry.
    pub fn cancel_payment(&mut self) -> Result<(), OrderError> {
        self.guard(CheckoutState::PaymentPending, CheckoutState::Submitted)?;
        self.state = CheckoutState::Submitted;
        Ok(())
    }

    /// Explicit user action: throw the order away and start over.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn guard(&self, expected: CheckoutState, to: CheckoutState) -> Result<(), OrderError> {
        if self.state != expected {
            return Err(OrderError::InvalidTransition { from: self.state, to });
        }
        Ok(())
    }
}

impl Default for OrderSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: CheckoutState,
        to: CheckoutState,
    },

    #[error("No order in session")]
    NoOrder,
}
