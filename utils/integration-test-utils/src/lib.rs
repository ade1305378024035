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

//! Shared fakes for `data-plane-client` integration tests.

use async_trait::async_trait;
use bytes::{Buf, BufMut, BytesMut};
use data_plane_client::{
    ChannelFactory, Codec, DataChannel, DataClientError, DataReceiver, Elements,
    EndpointDescriptor, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, Once};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOOPBACK_TAG: &str = "LoopbackChannelFactory:";
const LOOPBACK_FN_OPEN_TAG: &str = "open():";

const CHANNEL_CAPACITY: usize = 64;

static LOGGING: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, once per process.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_test_writer())
            .with(filter)
            .try_init();
    });
}

/// The coordinator's side of one loopback channel.
pub struct RemoteEnd {
    outbound: Mutex<mpsc::Receiver<Elements>>,
    inbound: mpsc::Sender<Elements>,
}

impl RemoteEnd {
    /// Sends a batch to the client as if the coordinator had written it.
    pub async fn push_inbound(&self, elements: Elements) {
        self.inbound
            .send(elements)
            .await
            .expect("client side of loopback channel is gone");
    }

    /// Next batch the client wrote, or `None` if none arrives within `timeout`.
    pub async fn recv_outbound(&self, timeout: Duration) -> Option<Elements> {
        let mut outbound = self.outbound.lock().await;
        tokio::time::timeout(timeout, outbound.recv())
            .await
            .ok()
            .flatten()
    }

    /// Collects batches until the client has been quiet for `idle`.
    pub async fn drain_outbound(&self, idle: Duration) -> Vec<Elements> {
        let mut drained = Vec::new();
        while let Some(elements) = self.recv_outbound(idle).await {
            drained.push(elements);
        }
        drained
    }
}

/// In-memory [`ChannelFactory`] that keeps the far end of every channel it
/// opens so tests can play the coordinator.
#[derive(Default)]
pub struct LoopbackChannelFactory {
    opens: StdMutex<HashMap<String, usize>>,
    failures: StdMutex<HashMap<String, usize>>,
    remotes: StdMutex<HashMap<String, Arc<RemoteEnd>>>,
    open_delay: Duration,
}

impl LoopbackChannelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `open` sleep for `delay` first, widening race windows.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    /// The next `count` opens of `url` fail with a construction error.
    pub fn fail_next(&self, url: &str, count: usize) {
        self.failures
            .lock()
            .expect("lock failures")
            .insert(url.to_string(), count);
    }

    /// Number of `open` calls made for `url`, failed ones included.
    pub fn open_count(&self, url: &str) -> usize {
        self.opens
            .lock()
            .expect("lock opens")
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_opens(&self) -> usize {
        self.opens.lock().expect("lock opens").values().sum()
    }

    /// Far end of the most recent channel opened for `url`.
    pub fn remote(&self, url: &str) -> Arc<RemoteEnd> {
        self.remotes
            .lock()
            .expect("lock remotes")
            .get(url)
            .cloned()
            .unwrap_or_else(|| panic!("no channel was opened for {url}"))
    }
}

#[async_trait]
impl ChannelFactory for LoopbackChannelFactory {
    async fn open(&self, descriptor: &EndpointDescriptor) -> Result<DataChannel> {
        let url = descriptor.url().to_string();
        *self
            .opens
            .lock()
            .expect("lock opens")
            .entry(url.clone())
            .or_default() += 1;

        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }

        {
            let mut failures = self.failures.lock().expect("lock failures");
            if let Some(remaining) = failures.get_mut(&url) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DataClientError::ChannelConstruction {
                        url,
                        reason: "loopback refused connection".to_string(),
                    });
                }
            }
        }

        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.remotes.lock().expect("lock remotes").insert(
            url.clone(),
            Arc::new(RemoteEnd {
                outbound: Mutex::new(outbound_rx),
                inbound: inbound_tx,
            }),
        );

        debug!("{}:{} opened loopback channel to {}", LOOPBACK_TAG, LOOPBACK_FN_OPEN_TAG, url);
        Ok(DataChannel::new(outbound_tx, inbound_rx))
    }
}

/// Receiver that records every batch and wakes waiters on arrival.
#[derive(Default)]
pub struct RecordingReceiver {
    received: StdMutex<Vec<Elements>>,
    arrived: Notify,
}

impl RecordingReceiver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn received(&self) -> Vec<Elements> {
        self.received.lock().expect("lock received").clone()
    }

    /// Waits until at least `count` batches arrived; returns whether they did
    /// within `timeout`.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let waiting = async {
            loop {
                let notified = self.arrived.notified();
                if self.received.lock().expect("lock received").len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, waiting).await.is_ok()
    }
}

#[async_trait]
impl DataReceiver for RecordingReceiver {
    async fn on_receive(&self, elements: Elements) {
        self.received.lock().expect("lock received").push(elements);
        self.arrived.notify_waiters();
    }
}

/// Encodes each `u32` as four big-endian bytes.
pub struct FixedWidthCodec;

impl Codec<u32> for FixedWidthCodec {
    fn encode(&self, record: &u32, out: &mut BytesMut) -> Result<()> {
        out.put_u32(*record);
        Ok(())
    }
}

/// Decodes a payload written by [`FixedWidthCodec`].
pub fn decode_u32s(mut payload: &[u8]) -> Vec<u32> {
    let mut decoded = Vec::with_capacity(payload.len() / 4);
    while payload.remaining() >= 4 {
        decoded.push(payload.get_u32());
    }
    decoded
}
