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

//! Control-plane layer.
//!
//! Owns the endpoint cache, the single gate through which multiplexers come
//! into existence, and the registration router that routes an instruction's
//! receiver on every endpoint it reads from.
//!
//! ```
//! use data_plane_client::{
//!     DataMultiplexer, EndpointCache, EndpointDescriptor, MultiplexerBuilder,
//! };
//! # use async_trait::async_trait;
//! # use data_plane_client::{DataReceiver, InstructionId, OutboundSink, Elements};
//! # use std::sync::Arc;
//! #
//! # struct NoopSink;
//! # #[async_trait]
//! # impl OutboundSink for NoopSink {
//! #     async fn send(&self, _elements: Elements) -> data_plane_client::Result<()> { Ok(()) }
//! # }
//! # struct NoopMultiplexer;
//! # #[async_trait]
//! # impl DataMultiplexer for NoopMultiplexer {
//! #     async fn register_consumer(&self, _id: &InstructionId, _r: Arc<dyn DataReceiver>) -> data_plane_client::Result<()> { Ok(()) }
//! #     async fn unregister_consumer(&self, _id: &InstructionId) -> data_plane_client::Result<()> { Ok(()) }
//! #     fn outbound_sink(&self) -> Arc<dyn OutboundSink> { Arc::new(NoopSink) }
//! # }
//! # struct NoopBuilder;
//! # #[async_trait]
//! # impl MultiplexerBuilder for NoopBuilder {
//! #     async fn build(&self, _d: &EndpointDescriptor) -> data_plane_client::Result<Arc<dyn DataMultiplexer>> {
//! #         Ok(Arc::new(NoopMultiplexer))
//! #     }
//! # }
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cache = EndpointCache::new(Arc::new(NoopBuilder));
//! let descriptor = EndpointDescriptor::new("coordinator:9000");
//!
//! let first = cache.resolve(&descriptor).await.unwrap();
//! let second = cache.resolve(&descriptor).await.unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! # });
//! ```

pub(crate) mod endpoint_cache;
pub(crate) mod registration;
