//! Default multiplexer over one physical bidirectional stream.

use crate::data_plane::outbound_observer::OutboundObserverFactory;
use crate::error::{DataClientError, Result};
use crate::model::elements::Elements;
use crate::model::endpoint::EndpointDescriptor;
use crate::model::instruction::InstructionId;
use crate::multiplexer::{
    ChannelFactory, DataChannel, DataMultiplexer, DataReceiver, MultiplexerBuilder, OutboundSink,
};
use crate::observability::{events, fields};
use crate::runtime::worker_runtime::spawn_receive_loop;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "stream_multiplexer";
const STREAM_MULTIPLEXER_TAG: &str = "StreamMultiplexer:";
const STREAM_MULTIPLEXER_FN_REGISTER_TAG: &str = "register_consumer():";
const STREAM_MULTIPLEXER_FN_UNREGISTER_TAG: &str = "unregister_consumer():";

type Routes = RwLock<HashMap<InstructionId, Arc<dyn DataReceiver>>>;

/// Shares one physical stream among every instruction talking to an endpoint.
///
/// Inbound batches are split per instruction and handed to the registered
/// receiver from a single dispatch task. Delivery holds the route table's read
/// lock, and unregistration takes the write lock, so a receiver sees nothing
/// once its unregistration has returned.
pub struct StreamMultiplexer {
    id: String,
    url: String,
    routes: Arc<Routes>,
    outbound_sink: Arc<dyn OutboundSink>,
    dispatch: JoinHandle<()>,
}

impl StreamMultiplexer {
    /// Starts dispatching the channel's inbound half and wraps its outbound
    /// half with `observer_factory`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        descriptor: &EndpointDescriptor,
        channel: DataChannel,
        observer_factory: &dyn OutboundObserverFactory,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let url = descriptor.url().to_string();
        let routes: Arc<Routes> = Arc::new(RwLock::new(HashMap::new()));

        let DataChannel { outbound, inbound } = channel;
        let outbound_sink = observer_factory.outbound_sink(descriptor, outbound);

        let dispatch_routes = routes.clone();
        let dispatch_id = id.clone();
        let dispatch_url = url.clone();
        let dispatch = spawn_receive_loop(inbound, move |inbound| {
            Self::inbound_dispatch_loop(dispatch_id, dispatch_url, dispatch_routes, inbound)
        });

        info!(
            "{}:{} started multiplexer for {}",
            id, STREAM_MULTIPLEXER_TAG, url
        );

        Self {
            id,
            url,
            routes,
            outbound_sink,
            dispatch,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn registered_instructions(&self) -> Vec<InstructionId> {
        let mut ids: Vec<InstructionId> = self.routes.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn inbound_dispatch_loop(
        id: String,
        url: String,
        routes: Arc<Routes>,
        mut inbound: mpsc::Receiver<Elements>,
    ) {
        while let Some(elements) = inbound.recv().await {
            for (instruction_id, batch) in elements.split_by_instruction() {
                let routes = routes.read().await;
                let Some(receiver) = routes.get(&instruction_id) else {
                    warn!(
                        event = events::INBOUND_DROP_UNROUTED,
                        component = COMPONENT,
                        multiplexer = %id,
                        url = %url,
                        instruction_id = %instruction_id,
                        endpoints = %fields::format_chunk_endpoints(&batch),
                        "no receiver registered; dropping inbound batch"
                    );
                    continue;
                };

                debug!(
                    event = events::INBOUND_DISPATCH,
                    component = COMPONENT,
                    multiplexer = %id,
                    instruction_id = %instruction_id,
                    chunks = batch.len(),
                    payload_bytes = fields::payload_bytes(&batch),
                    "dispatching inbound batch"
                );
                receiver.on_receive(batch).await;
            }
        }

        info!(
            event = events::INBOUND_STREAM_ENDED,
            component = COMPONENT,
            multiplexer = %id,
            url = %url,
            "inbound stream ended"
        );
    }
}

#[async_trait]
impl DataMultiplexer for StreamMultiplexer {
    async fn register_consumer(
        &self,
        instruction_id: &InstructionId,
        receiver: Arc<dyn DataReceiver>,
    ) -> Result<()> {
        let mut routes = self.routes.write().await;
        if routes.contains_key(instruction_id) {
            warn!(
                "{}:{}:{} {} already registered",
                self.id, STREAM_MULTIPLEXER_TAG, STREAM_MULTIPLEXER_FN_REGISTER_TAG, instruction_id
            );
            return Err(DataClientError::AlreadyRegistered {
                instruction_id: instruction_id.clone(),
                url: self.url.clone(),
            });
        }
        routes.insert(instruction_id.clone(), receiver);
        debug!(
            "{}:{}:{} registered {}",
            self.id, STREAM_MULTIPLEXER_TAG, STREAM_MULTIPLEXER_FN_REGISTER_TAG, instruction_id
        );
        Ok(())
    }

    async fn unregister_consumer(&self, instruction_id: &InstructionId) -> Result<()> {
        let removed = self.routes.write().await.remove(instruction_id);
        if removed.is_none() {
            debug!(
                event = events::ROUTE_UNREGISTER_MISSING,
                component = COMPONENT,
                multiplexer = %self.id,
                instruction_id = %instruction_id,
                "{}:{} nothing registered",
                STREAM_MULTIPLEXER_TAG,
                STREAM_MULTIPLEXER_FN_UNREGISTER_TAG
            );
        }
        Ok(())
    }

    fn outbound_sink(&self) -> Arc<dyn OutboundSink> {
        self.outbound_sink.clone()
    }
}

impl Drop for StreamMultiplexer {
    fn drop(&mut self) {
        self.dispatch.abort();
        debug!(
            "{}:{} stopped multiplexer for {}",
            self.id, STREAM_MULTIPLEXER_TAG, self.url
        );
    }
}

/// Opens a channel and starts a [`StreamMultiplexer`] on it.
pub struct StreamMultiplexerBuilder {
    channel_factory: Arc<dyn ChannelFactory>,
    observer_factory: Arc<dyn OutboundObserverFactory>,
}

impl StreamMultiplexerBuilder {
    pub fn new(
        channel_factory: Arc<dyn ChannelFactory>,
        observer_factory: Arc<dyn OutboundObserverFactory>,
    ) -> Self {
        Self {
            channel_factory,
            observer_factory,
        }
    }
}

#[async_trait]
impl MultiplexerBuilder for StreamMultiplexerBuilder {
    async fn build(&self, descriptor: &EndpointDescriptor) -> Result<Arc<dyn DataMultiplexer>> {
        let channel = self.channel_factory.open(descriptor).await?;
        Ok(Arc::new(StreamMultiplexer::start(
            descriptor,
            channel,
            self.observer_factory.as_ref(),
        )))
    }
}
