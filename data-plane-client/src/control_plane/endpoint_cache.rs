//! Endpoint-to-multiplexer cache with at-most-once lazy construction.

use crate::error::{DataClientError, Result};
use crate::model::endpoint::EndpointDescriptor;
use crate::multiplexer::{DataMultiplexer, MultiplexerBuilder};
use crate::observability::events;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

const COMPONENT: &str = "endpoint_cache";

type MultiplexerSlot = Arc<OnceCell<Arc<dyn DataMultiplexer>>>;

/// Maps each endpoint to the one multiplexer serving it.
///
/// Every descriptor owns a slot that is filled at most once. Callers racing on
/// an unseen descriptor share the slot; one of them runs the builder and the
/// rest wait for its result. Lookups of a filled slot never wait.
///
/// A failed construction leaves nothing behind, so the next `resolve` for the
/// same descriptor builds from scratch. Multiplexers stay cached until
/// [`evict`](Self::evict) removes them.
pub struct EndpointCache {
    builder: Arc<dyn MultiplexerBuilder>,
    multiplexers: DashMap<EndpointDescriptor, MultiplexerSlot>,
}

impl EndpointCache {
    pub fn new(builder: Arc<dyn MultiplexerBuilder>) -> Self {
        Self {
            builder,
            multiplexers: DashMap::new(),
        }
    }

    /// Returns the multiplexer for `descriptor`, building it on first use.
    pub async fn resolve(&self, descriptor: &EndpointDescriptor) -> Result<Arc<dyn DataMultiplexer>> {
        if let Some(multiplexer) = self.cached(descriptor) {
            return Ok(multiplexer);
        }

        let slot = self
            .multiplexers
            .entry(descriptor.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        let built = slot
            .get_or_try_init(|| async {
                let multiplexer = self.builder.build(descriptor).await?;
                info!(
                    event = events::CACHE_CONSTRUCT,
                    component = COMPONENT,
                    url = %descriptor,
                    "constructed multiplexer"
                );
                Ok::<_, DataClientError>(multiplexer)
            })
            .await
            .cloned();

        if let Err(err) = &built {
            warn!(
                event = events::CACHE_CONSTRUCT_FAILED,
                component = COMPONENT,
                url = %descriptor,
                err = %err,
                "multiplexer construction failed"
            );
            // Only drop the slot when no other caller is waiting on it; a waiter
            // retries construction into the same slot.
            self.multiplexers.remove_if(descriptor, |_, cached| {
                Arc::ptr_eq(cached, &slot) && cached.get().is_none() && Arc::strong_count(cached) == 2
            });
        }
        built
    }

    fn cached(&self, descriptor: &EndpointDescriptor) -> Option<Arc<dyn DataMultiplexer>> {
        self.multiplexers
            .get(descriptor)
            .and_then(|slot| slot.value().get().cloned())
    }

    /// Removes the multiplexer for `descriptor` from the cache.
    ///
    /// The multiplexer shuts down once the last outstanding handle to it,
    /// including open writers' sinks, is dropped. A later `resolve` builds a new
    /// one.
    ///
    /// A descriptor whose multiplexer is still being constructed is left alone
    /// and `None` is returned.
    pub fn evict(&self, descriptor: &EndpointDescriptor) -> Option<Arc<dyn DataMultiplexer>> {
        let (_, slot) = self
            .multiplexers
            .remove_if(descriptor, |_, slot| slot.initialized())?;
        let evicted = slot.get().cloned();
        info!(
            event = events::CACHE_EVICT,
            component = COMPONENT,
            url = %descriptor,
            "evicted multiplexer"
        );
        evicted
    }

    pub fn contains(&self, descriptor: &EndpointDescriptor) -> bool {
        self.cached(descriptor).is_some()
    }

    /// Number of endpoints with a constructed multiplexer.
    pub fn len(&self) -> usize {
        self.multiplexers
            .iter()
            .filter(|slot| slot.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
