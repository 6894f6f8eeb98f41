//! HTTP API module for the Efficiency Engine.
//!
//! This module provides the REST endpoint that runs the full pipeline over
//! a posted batch of transactions and time sheets.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ComputeEfficiencyRequest, WindowRequest};
pub use response::{ApiError, ComputeEfficiencyResponse, RecordResponse, SiteSummary};
pub use state::AppState;
