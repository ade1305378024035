//! API facade layer.
//!
//! Keeps the outward surface to [`crate::DataClient`] while the control and data
//! planes own the behavior behind it.

pub(crate) mod data_client;
