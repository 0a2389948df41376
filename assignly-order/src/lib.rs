pub mod backend;
pub mod checkout;
pub mod gateway;
pub mod session;

pub use backend::{RequestService, SubmitError};
pub use checkout::{CheckoutError, CheckoutOrchestrator, PaymentFlow};
pub use gateway::{GatewayOutcome, PaymentGateway, PaymentResult, SessionRequest};
pub use session::{CheckoutState, OrderError, OrderSession};
