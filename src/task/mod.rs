//! Task lifecycle for scheduled prompt executions.
//!
//! Tasks are generated one per prompt, claimed in bulk by an external
//! consumer, and closed by a completion report that is evaluated for brand
//! exposure and persisted atomically with its citations. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
