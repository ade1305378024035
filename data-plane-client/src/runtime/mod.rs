//! Runtime integration layer.
//!
//! Keeps task spawning in one place so the multiplexer and observer code do
//! not carry their own runtime assumptions.

pub(crate) mod worker_runtime;
