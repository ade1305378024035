//! Shared outbound sinks placed in front of a physical stream.

use crate::config::{DataClientConfig, OutboundObserverKind};
use crate::error::{DataClientError, Result};
use crate::model::elements::Elements;
use crate::model::endpoint::EndpointDescriptor;
use crate::multiplexer::OutboundSink;
use crate::observability::{events, fields};
use crate::runtime::worker_runtime::spawn_receive_loop;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

const COMPONENT: &str = "outbound_observer";

/// Wraps the outbound half of a physical stream into the multiplexer's shared
/// sink.
pub trait OutboundObserverFactory: Send + Sync {
    fn outbound_sink(
        &self,
        descriptor: &EndpointDescriptor,
        outbound: mpsc::Sender<Elements>,
    ) -> Arc<dyn OutboundSink>;
}

/// Picks the observer factory named by the configuration.
pub fn observer_factory_for(config: &DataClientConfig) -> Arc<dyn OutboundObserverFactory> {
    match config.outbound_observer {
        OutboundObserverKind::Direct => Arc::new(DirectObserverFactory),
        OutboundObserverKind::Buffered => {
            Arc::new(BufferedObserverFactory::new(config.outbound_queue_capacity))
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DirectObserverFactory;

impl OutboundObserverFactory for DirectObserverFactory {
    fn outbound_sink(
        &self,
        descriptor: &EndpointDescriptor,
        outbound: mpsc::Sender<Elements>,
    ) -> Arc<dyn OutboundSink> {
        Arc::new(DirectSink {
            url: descriptor.url().to_string(),
            outbound,
        })
    }
}

/// Sends every batch straight into the stream.
///
/// The channel accepts one whole batch per `send`, which keeps concurrent
/// writers from interleaving inside a batch.
struct DirectSink {
    url: String,
    outbound: mpsc::Sender<Elements>,
}

#[async_trait]
impl OutboundSink for DirectSink {
    async fn send(&self, elements: Elements) -> Result<()> {
        trace!(
            component = COMPONENT,
            url = %self.url,
            endpoints = %fields::format_chunk_endpoints(&elements),
            "direct send"
        );
        self.outbound
            .send(elements)
            .await
            .map_err(|_| DataClientError::stream_closed(&self.url))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BufferedObserverFactory {
    capacity: usize,
}

impl BufferedObserverFactory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }
}

impl OutboundObserverFactory for BufferedObserverFactory {
    fn outbound_sink(
        &self,
        descriptor: &EndpointDescriptor,
        outbound: mpsc::Sender<Elements>,
    ) -> Arc<dyn OutboundSink> {
        let url = descriptor.url().to_string();
        let (queue, queued) = mpsc::channel(self.capacity);

        let drain_url = url.clone();
        spawn_receive_loop(queued, move |queued| drain_queue(drain_url, queued, outbound));

        Arc::new(QueuedSink { url, queue })
    }
}

/// Enqueues batches for a background task that forwards them in order.
///
/// The drain task ends once every sender of the queue has been dropped and the
/// queue is empty, so nothing accepted by `send` is discarded on shutdown.
struct QueuedSink {
    url: String,
    queue: mpsc::Sender<Elements>,
}

#[async_trait]
impl OutboundSink for QueuedSink {
    async fn send(&self, elements: Elements) -> Result<()> {
        self.queue
            .send(elements)
            .await
            .map_err(|_| DataClientError::stream_closed(&self.url))
    }
}

async fn drain_queue(
    url: String,
    mut queued: mpsc::Receiver<Elements>,
    outbound: mpsc::Sender<Elements>,
) {
    while let Some(elements) = queued.recv().await {
        let payload_bytes = fields::payload_bytes(&elements);
        if outbound.send(elements).await.is_err() {
            warn!(
                event = events::OUTBOUND_QUEUE_DRAIN_STOPPED,
                component = COMPONENT,
                url = %url,
                payload_bytes,
                "physical stream closed; dropping queued batches"
            );
            return;
        }
    }
    debug!(
        event = events::OUTBOUND_QUEUE_DRAIN_STOPPED,
        component = COMPONENT,
        url = %url,
        "outbound queue drained"
    );
}
