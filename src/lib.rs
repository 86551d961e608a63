//! Geoscope: daily prompt distribution and brand exposure scoring.
//!
//! A fixed catalogue of prompts is turned into a batch of tasks every day.
//! External consumers claim pending tasks, run the prompts against a large
//! language model, and report the responses back. Each completed response is
//! scored for brand exposure by a second model call and stored with its
//! citations.
//!
//! # Architecture
//!
//! Geoscope follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP)
//!
//! # Modules
//!
//! - [`prompt`]: Prompt catalogue
//! - [`task`]: Task generation, claiming, and completion recording
//! - [`exposure`]: Brand exposure evaluation
//! - [`scheduler`]: Periodic generation trigger
//! - [`config`], [`telemetry`], and [`shutdown`]: Service wiring

pub mod config;
pub mod error;
pub mod exposure;
pub mod prompt;
pub mod scheduler;
pub mod shutdown;
pub mod task;
pub mod telemetry;
