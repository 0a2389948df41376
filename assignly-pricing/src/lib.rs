pub mod app_config;
pub mod engine;

pub use app_config::PricingConfig;
pub use engine::{PriceLineItem, PricingEngine, PricingError, PricingResult};
