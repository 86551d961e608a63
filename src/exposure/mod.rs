//! Brand-exposure evaluation of model responses.
//!
//! A completed task's response text is sent to an external chat-completion
//! endpoint together with a fixed analysis prompt; the model answers with a
//! JSON object holding a brand score, mention count, rank, and a short
//! analysis. Callers treat every evaluation error as recoverable: the
//! evaluator never persists anything and never retries.

pub mod adapters;
pub mod domain;
pub mod ports;
