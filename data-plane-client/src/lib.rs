/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # data-plane-client
//!
//! `data-plane-client` lets a worker exchange element batches with its
//! coordinator. Every logical stream is addressed by an instruction id and a
//! target; all streams towards one endpoint share a single multiplexed
//! connection.
//!
//! Typical usage is centered on [`DataClient`]:
//!
//! - [`DataClient::register_receiver`] routes inbound data for an instruction
//!   to a [`DataReceiver`] on a set of endpoints,
//! - [`DataClient::send`] opens an [`OutboundWriter`] for one logical endpoint,
//! - [`DataClient::unregister_receiver`] removes the routes once the
//!   instruction completes.
//!
//! ```
//! use async_trait::async_trait;
//! use data_plane_client::{
//!     ChannelFactory, Codec, DataChannel, DataClient, DataClientConfig, DataReceiver, Elements,
//!     EndpointDescriptor, InstructionId, LogicalEndpoint, Utf8StringCodec,
//! };
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! /// Hands out channels whose far side discards everything it is sent.
//! struct DetachedChannels;
//!
//! #[async_trait]
//! impl ChannelFactory for DetachedChannels {
//!     async fn open(&self, _descriptor: &EndpointDescriptor) -> data_plane_client::Result<DataChannel> {
//!         let (outbound_tx, mut outbound_rx) = mpsc::channel::<Elements>(16);
//!         let (_inbound_tx, inbound_rx) = mpsc::channel(16);
//!         tokio::spawn(async move { while outbound_rx.recv().await.is_some() {} });
//!         Ok(DataChannel::new(outbound_tx, inbound_rx))
//!     }
//! }
//!
//! struct PrintingReceiver;
//!
//! #[async_trait]
//! impl DataReceiver for PrintingReceiver {
//!     async fn on_receive(&self, elements: Elements) {
//!         println!("received {} chunks", elements.len());
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let client = DataClient::new(DataClientConfig::default(), Arc::new(DetachedChannels)).unwrap();
//! let coordinator = EndpointDescriptor::new("coordinator:9000");
//! let instruction = InstructionId::from("bundle-1");
//!
//! client
//!     .register_receiver(&instruction, &[coordinator.clone()], Arc::new(PrintingReceiver))
//!     .await
//!     .unwrap();
//!
//! let codec: Arc<dyn Codec<String>> = Arc::new(Utf8StringCodec);
//! let mut writer = client
//!     .send(&coordinator, LogicalEndpoint::data(instruction.clone(), "sink"), codec)
//!     .await
//!     .unwrap();
//! writer.write(&"hello".to_string()).await.unwrap();
//! writer.close().await.unwrap();
//!
//! client
//!     .unregister_receiver(&instruction, &[coordinator])
//!     .await
//!     .unwrap();
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward `DataClient` surface
//! - Control plane: endpoint cache and instruction registration routing
//! - Data plane: stream multiplexer, outbound observers, outbound writer
//! - Runtime: background loop spawning
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events. Library code emits events and
//! never initializes a global subscriber; binaries and tests install
//! `tracing_subscriber` once at process boundaries.

mod api;
mod codec;
mod config;
mod control_plane;
mod data_plane;
mod error;
mod model;
mod multiplexer;
#[doc(hidden)]
pub mod observability;
mod runtime;

pub use api::data_client::DataClient;
pub use codec::{Codec, JsonCodec, LengthPrefixedBytesCodec, Utf8StringCodec};
pub use config::{
    DataClientConfig, OutboundObserverKind, DEFAULT_OUTBOUND_BUFFER_LIMIT_BYTES,
    DEFAULT_OUTBOUND_QUEUE_CAPACITY,
};
pub use control_plane::endpoint_cache::EndpointCache;
pub use data_plane::outbound_observer::{
    observer_factory_for, BufferedObserverFactory, DirectObserverFactory,
    OutboundObserverFactory,
};
pub use data_plane::outbound_writer::OutboundWriter;
pub use data_plane::stream_multiplexer::{StreamMultiplexer, StreamMultiplexerBuilder};
pub use error::{DataClientError, Result};
pub use model::elements::{DataChunk, Elements};
pub use model::endpoint::EndpointDescriptor;
pub use model::instruction::InstructionId;
pub use model::logical_endpoint::LogicalEndpoint;
pub use multiplexer::{
    ChannelFactory, DataChannel, DataMultiplexer, DataReceiver, MultiplexerBuilder, OutboundSink,
};
