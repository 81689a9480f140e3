//! Core module - Reconciliation and orchestration
//!
//! Parses answer records, diffs them against the remote knowledge base and
//! drives the resulting operations to completion.

pub mod monitor;
pub mod query;
pub mod reconcile;
pub mod record;
pub mod service;
pub mod snapshot;
pub mod submit;
pub mod trainer;
