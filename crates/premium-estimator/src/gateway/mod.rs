//! HTTP gateway: caller identity, prediction intake, history and dashboard endpoints.

mod error;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::GatewayError;
pub use router::{premium_router, GatewayState};
pub use service::{PredictionError, PredictionOutcome, PremiumService};
