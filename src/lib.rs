//! Workforce Efficiency Engine
//!
//! This crate reconciles time-and-attendance punches with warehouse
//! transaction scans into shifts, attributes the scans of each shift to
//! fixed-length sub-intervals, and produces one efficiency record per
//! interval and transaction type. It ships a YAML-backed reference catalog,
//! an in-memory activity store and an HTTP service over the full pipeline.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod providers;
