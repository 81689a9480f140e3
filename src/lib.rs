//! qnakb - Question-answering knowledge base client
//!
//! Manages a hosted question-answering knowledge base from delimited files.
//!
//! ## Key Concepts
//!
//! - **Answer records**: one answer plus its question variants, one per row
//! - **Reconciliation**: records are matched to remote entries by answer text;
//!   unknown answers are added, known ones get their questions merged or replaced
//! - **Operations**: every mutation is asynchronous on the service and is
//!   polled until it succeeds, fails or runs out of attempts
//! - **Slices**: the editable test copy and the published production copy

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod remote;

pub use core::record::AnswerRecord;
pub use core::service::QnaService;
pub use error::{QnaError, Result};
pub use remote::{HttpBackend, QnaBackend};
