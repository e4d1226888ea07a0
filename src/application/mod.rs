//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod accounts;
pub mod alerts;
mod prediction;

pub use accounts::AccountService;
pub use alerts::{AlertAttempt, AlertDispatcher, AlertPolicy};
pub use prediction::{PredictionRequest, PredictionResponse, PredictionService};
