//! Remote data-plane listener identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

const ENDPOINT_DESCRIPTOR_TAG: &str = "EndpointDescriptor:";
const ENDPOINT_DESCRIPTOR_FN_NEW_TAG: &str = "new():";

/// Identifies a remote data-plane listener.
///
/// Two descriptors are the same endpoint when both the url and every
/// connection parameter match. Parameters are kept ordered so the descriptor
/// hashes the same regardless of insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    url: String,
    #[serde(default)]
    params: BTreeMap<String, String>,
}

impl EndpointDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        debug!(
            "{}:{} Creating EndpointDescriptor for: ({:?})",
            ENDPOINT_DESCRIPTOR_TAG, ENDPOINT_DESCRIPTOR_FN_NEW_TAG, url
        );

        Self {
            url,
            params: BTreeMap::new(),
        }
    }

    /// Returns a copy of this descriptor with one more connection parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl Display for EndpointDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}
