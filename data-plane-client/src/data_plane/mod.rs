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

//! Data-plane layer.
//!
//! Owns the default stream multiplexer, the outbound observers that put its
//! shared sink in front of the physical stream, and the per-stream outbound
//! writer.
//!
//! ```
//! use data_plane_client::{DataChunk, Elements, LogicalEndpoint, StreamMultiplexer};
//! use data_plane_client::{DataChannel, DataMultiplexer, DirectObserverFactory, OutboundSink};
//! use data_plane_client::EndpointDescriptor;
//! use tokio::sync::mpsc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (outbound_tx, mut outbound_rx) = mpsc::channel(8);
//! let (_inbound_tx, inbound_rx) = mpsc::channel(8);
//! let descriptor = EndpointDescriptor::new("coordinator:9000");
//!
//! let multiplexer = StreamMultiplexer::start(
//!     &descriptor,
//!     DataChannel::new(outbound_tx, inbound_rx),
//!     &DirectObserverFactory,
//! );
//!
//! let terminal = DataChunk::terminal(LogicalEndpoint::data("i1", "out"));
//! multiplexer
//!     .outbound_sink()
//!     .send(Elements::single(terminal.clone()))
//!     .await
//!     .unwrap();
//! assert_eq!(outbound_rx.recv().await.unwrap().data, vec![terminal]);
//! # });
//! ```

pub(crate) mod outbound_observer;
pub(crate) mod outbound_writer;
pub(crate) mod stream_multiplexer;
