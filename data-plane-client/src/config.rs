//! Process-wide tunables for the data-plane client.
//!
//! The configuration is read once at startup and handed to
//! [`crate::DataClient::new`]; nothing in it changes afterwards.
//!
//! ```
//! use data_plane_client::{DataClientConfig, OutboundObserverKind};
//!
//! let config = DataClientConfig::from_json5_str(
//!     r#"{
//!         // flush every 64 KiB
//!         outbound_buffer_limit_bytes: 65536,
//!         outbound_observer: "buffered",
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.outbound_buffer_limit_bytes, 65536);
//! assert_eq!(config.outbound_observer, OutboundObserverKind::Buffered);
//! ```

use crate::error::{DataClientError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

const DATA_CLIENT_CONFIG_TAG: &str = "DataClientConfig:";
const DATA_CLIENT_CONFIG_FN_FROM_JSON5_FILE_TAG: &str = "from_json5_file():";

pub const DEFAULT_OUTBOUND_BUFFER_LIMIT_BYTES: usize = 1_000_000;
pub const DEFAULT_OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// How a multiplexer's shared outbound sink reaches the physical stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundObserverKind {
    /// Writers hand batches straight to the stream.
    #[default]
    Direct,
    /// Writers enqueue batches on a bounded queue drained by a background task.
    Buffered,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataClientConfig {
    /// Buffered bytes at which an outbound writer flushes a data chunk.
    pub outbound_buffer_limit_bytes: usize,
    pub outbound_observer: OutboundObserverKind,
    /// Queue capacity used by [`OutboundObserverKind::Buffered`].
    pub outbound_queue_capacity: usize,
}

impl Default for DataClientConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_limit_bytes: DEFAULT_OUTBOUND_BUFFER_LIMIT_BYTES,
            outbound_observer: OutboundObserverKind::default(),
            outbound_queue_capacity: DEFAULT_OUTBOUND_QUEUE_CAPACITY,
        }
    }
}

impl DataClientConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self> {
        let config: Self = json5::from_str(contents)
            .map_err(|e| DataClientError::Config(format!("unable to parse json5: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(
            "{DATA_CLIENT_CONFIG_TAG}:{DATA_CLIENT_CONFIG_FN_FROM_JSON5_FILE_TAG} reading {}",
            path.display()
        );
        let contents = fs::read_to_string(path).map_err(|e| {
            DataClientError::Config(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::from_json5_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.outbound_buffer_limit_bytes == 0 {
            return Err(DataClientError::Config(
                "outbound_buffer_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(DataClientError::Config(
                "outbound_queue_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
