//! Adapter implementations for prompt persistence.

pub mod memory;
pub mod postgres;
