//! Instruction-scoped receiver registration across endpoints.

use crate::control_plane::endpoint_cache::EndpointCache;
use crate::error::Result;
use crate::model::endpoint::EndpointDescriptor;
use crate::model::instruction::InstructionId;
use crate::multiplexer::DataReceiver;
use crate::observability::events;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "registration_router";
const REGISTRATION_ROUTER_TAG: &str = "RegistrationRouter:";
const REGISTRATION_ROUTER_FN_REGISTER_TAG: &str = "register_receiver():";

pub(crate) struct RegistrationRouter {
    cache: Arc<EndpointCache>,
}

impl RegistrationRouter {
    pub(crate) fn new(cache: Arc<EndpointCache>) -> Self {
        Self { cache }
    }

    /// Registers `receiver` for `instruction_id` on every endpoint, in order.
    ///
    /// Stops at the first failure. Endpoints registered before the failure keep
    /// their route; the caller undoes them with
    /// [`unregister_receiver`](Self::unregister_receiver).
    pub(crate) async fn register_receiver(
        &self,
        instruction_id: &InstructionId,
        endpoints: &[EndpointDescriptor],
        receiver: Arc<dyn DataReceiver>,
    ) -> Result<()> {
        debug!(
            event = events::ROUTE_REGISTER,
            component = COMPONENT,
            instruction_id = %instruction_id,
            endpoints = endpoints.len(),
            "registering receiver"
        );

        for (registered, descriptor) in endpoints.iter().enumerate() {
            let outcome = match self.cache.resolve(descriptor).await {
                Ok(multiplexer) => {
                    multiplexer
                        .register_consumer(instruction_id, receiver.clone())
                        .await
                }
                Err(err) => Err(err),
            };

            if let Err(err) = outcome {
                warn!(
                    "{}:{} {} registered on {} of {} endpoints before {} failed: {}",
                    REGISTRATION_ROUTER_TAG,
                    REGISTRATION_ROUTER_FN_REGISTER_TAG,
                    instruction_id,
                    registered,
                    endpoints.len(),
                    descriptor,
                    err
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Removes the route for `instruction_id` on every endpoint.
    ///
    /// Endpoints without a route for the instruction are skipped. Multiplexers
    /// stay cached even when this removes their last route.
    pub(crate) async fn unregister_receiver(
        &self,
        instruction_id: &InstructionId,
        endpoints: &[EndpointDescriptor],
    ) -> Result<()> {
        debug!(
            event = events::ROUTE_UNREGISTER,
            component = COMPONENT,
            instruction_id = %instruction_id,
            endpoints = endpoints.len(),
            "unregistering receiver"
        );

        for descriptor in endpoints {
            let multiplexer = self.cache.resolve(descriptor).await?;
            multiplexer.unregister_consumer(instruction_id).await?;
        }
        Ok(())
    }
}
