//! Prompt catalogue management.
//!
//! Prompts are the reusable instruction templates that the daily task
//! generator fans out into tasks. Tasks reference prompts by identity only,
//! so editing or deleting a prompt never touches existing tasks. The module
//! follows the same hexagonal layout as [`crate::task`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
