use crate::codec::Codec;
use crate::config::DataClientConfig;
use crate::control_plane::endpoint_cache::EndpointCache;
use crate::control_plane::registration::RegistrationRouter;
use crate::data_plane::outbound_observer::observer_factory_for;
use crate::data_plane::outbound_writer::OutboundWriter;
use crate::data_plane::stream_multiplexer::StreamMultiplexerBuilder;
use crate::error::Result;
use crate::model::endpoint::EndpointDescriptor;
use crate::model::instruction::InstructionId;
use crate::model::logical_endpoint::LogicalEndpoint;
use crate::multiplexer::{ChannelFactory, DataReceiver, MultiplexerBuilder};
use std::sync::Arc;
use tracing::debug;

const DATA_CLIENT_TAG: &str = "DataClient:";
const DATA_CLIENT_FN_NEW_TAG: &str = "new():";
const DATA_CLIENT_FN_SEND_TAG: &str = "send():";

/// Worker-side client for the data plane.
///
/// Logical streams of any number of instructions share one multiplexed
/// connection per endpoint. Connections are opened lazily on first use and
/// kept until [`evict_endpoint`](Self::evict_endpoint) is called.
pub struct DataClient {
    config: DataClientConfig,
    cache: Arc<EndpointCache>,
    router: RegistrationRouter,
}

impl DataClient {
    /// Creates a client whose multiplexers run over channels from
    /// `channel_factory`, with the outbound observer the config selects.
    pub fn new(config: DataClientConfig, channel_factory: Arc<dyn ChannelFactory>) -> Result<Self> {
        let observer_factory = observer_factory_for(&config);
        let builder = StreamMultiplexerBuilder::new(channel_factory, observer_factory);
        Self::with_builder(config, Arc::new(builder))
    }

    /// Creates a client on top of a caller-supplied multiplexer builder.
    pub fn with_builder(
        config: DataClientConfig,
        builder: Arc<dyn MultiplexerBuilder>,
    ) -> Result<Self> {
        config.validate()?;
        debug!(
            "{}:{} DataClient created, outbound buffer limit: {} bytes, observer: {:?}",
            DATA_CLIENT_TAG,
            DATA_CLIENT_FN_NEW_TAG,
            config.outbound_buffer_limit_bytes,
            config.outbound_observer
        );

        let cache = Arc::new(EndpointCache::new(builder));
        Ok(Self {
            config,
            router: RegistrationRouter::new(cache.clone()),
            cache,
        })
    }

    pub fn config(&self) -> &DataClientConfig {
        &self.config
    }

    pub fn endpoint_cache(&self) -> &EndpointCache {
        &self.cache
    }

    /// Routes inbound data for `instruction_id` on each endpoint to
    /// `receiver`.
    ///
    /// Endpoints are handled in order. If one fails, the ones before it stay
    /// registered and the error is returned; undo them with
    /// [`unregister_receiver`](Self::unregister_receiver).
    pub async fn register_receiver(
        &self,
        instruction_id: &InstructionId,
        endpoints: &[EndpointDescriptor],
        receiver: Arc<dyn DataReceiver>,
    ) -> Result<()> {
        self.router
            .register_receiver(instruction_id, endpoints, receiver)
            .await
    }

    /// Stops routing inbound data for `instruction_id` on each endpoint.
    ///
    /// Unregistering an instruction that has no route is not an error.
    pub async fn unregister_receiver(
        &self,
        instruction_id: &InstructionId,
        endpoints: &[EndpointDescriptor],
    ) -> Result<()> {
        self.router
            .unregister_receiver(instruction_id, endpoints)
            .await
    }

    /// Opens a writer for `endpoint` on the multiplexer serving `descriptor`.
    ///
    /// The returned writer is not shared; closing it sends the end-of-stream
    /// chunk for `endpoint`.
    pub async fn send<T>(
        &self,
        descriptor: &EndpointDescriptor,
        endpoint: LogicalEndpoint,
        codec: Arc<dyn Codec<T>>,
    ) -> Result<OutboundWriter<T>> {
        let multiplexer = self.cache.resolve(descriptor).await?;

        debug!(
            "{}:{} Creating outbound writer for {} on {}",
            DATA_CLIENT_TAG, DATA_CLIENT_FN_SEND_TAG, endpoint, descriptor
        );
        Ok(OutboundWriter::new(
            endpoint,
            codec,
            multiplexer.outbound_sink(),
            self.config.outbound_buffer_limit_bytes,
        ))
    }

    /// Drops the cached multiplexer for `descriptor`, if any.
    ///
    /// Returns whether a multiplexer was evicted.
    pub fn evict_endpoint(&self, descriptor: &EndpointDescriptor) -> bool {
        self.cache.evict(descriptor).is_some()
    }
}
