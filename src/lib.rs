//! Album service - a small HTTP API over a relational album table
//!
//! The service exposes:
//! - `GET /albums/:id` to fetch a single album
//! - `POST /albums` to create one (the store assigns the id)
//! - `GET /` as a liveness probe
//!
//! Requests are traced with `tracing` (optionally exported over OTLP) and
//! timed into Prometheus metrics.

pub mod api;
pub mod config;
pub mod error;
pub mod profiler;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use error::{Error, Result};
