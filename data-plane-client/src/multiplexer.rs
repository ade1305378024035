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

//! Seams between the client layer and the physical stream.
//!
//! The client only ever talks to a [`DataMultiplexer`] through these traits,
//! so tests can substitute fakes for the multiplexer, its sink or the channel
//! underneath.

use crate::error::Result;
use crate::model::elements::Elements;
use crate::model::endpoint::EndpointDescriptor;
use crate::model::instruction::InstructionId;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Caller-owned consumer of inbound batches for one instruction.
///
/// Delivery happens on the multiplexer's dispatch task. Implementations should
/// hand work off quickly; a receiver that blocks stalls every instruction on
/// the same endpoint. Unregistering from inside `on_receive` deadlocks the
/// dispatch task.
#[async_trait]
pub trait DataReceiver: Send + Sync {
    async fn on_receive(&self, elements: Elements);
}

/// Shared outbound side of a multiplexed stream.
///
/// Each `send` writes one whole batch. Implementations serialize concurrent
/// sends so batches from different writers never interleave.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn send(&self, elements: Elements) -> Result<()>;
}

#[async_trait]
pub trait DataMultiplexer: Send + Sync {
    /// Routes inbound batches for `instruction_id` to `receiver`.
    ///
    /// Fails with [`crate::DataClientError::AlreadyRegistered`] when the
    /// instruction already has a receiver on this multiplexer.
    async fn register_consumer(
        &self,
        instruction_id: &InstructionId,
        receiver: Arc<dyn DataReceiver>,
    ) -> Result<()>;

    /// Removes the route for `instruction_id`.
    ///
    /// Once this returns the previously registered receiver gets no further
    /// batches. Removing an absent route is a no-op.
    async fn unregister_consumer(&self, instruction_id: &InstructionId) -> Result<()>;

    fn outbound_sink(&self) -> Arc<dyn OutboundSink>;
}

/// Builds the multiplexer for an endpoint; invoked by the endpoint cache only.
#[async_trait]
pub trait MultiplexerBuilder: Send + Sync {
    async fn build(&self, descriptor: &EndpointDescriptor) -> Result<Arc<dyn DataMultiplexer>>;
}

/// Both halves of a physical bidirectional stream.
///
/// Dropping `outbound` half-closes the stream from this side.
pub struct DataChannel {
    pub outbound: mpsc::Sender<Elements>,
    pub inbound: mpsc::Receiver<Elements>,
}

impl DataChannel {
    pub fn new(outbound: mpsc::Sender<Elements>, inbound: mpsc::Receiver<Elements>) -> Self {
        Self { outbound, inbound }
    }
}

#[async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, descriptor: &EndpointDescriptor) -> Result<DataChannel>;
}
