//! Error type shared by every data-plane operation.

use crate::model::instruction::InstructionId;
use crate::model::logical_endpoint::LogicalEndpoint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataClientError {
    /// Opening the physical channel or starting the multiplexer failed.
    ///
    /// Returned to whichever caller triggered the first resolution of the
    /// endpoint. Nothing is cached, so the next resolution tries again.
    #[error("unable to construct data channel for {url}: {reason}")]
    ChannelConstruction { url: String, reason: String },

    #[error("instruction {instruction_id} already has a registered receiver on {url}")]
    AlreadyRegistered {
        instruction_id: InstructionId,
        url: String,
    },

    #[error("outbound writer for {0} is closed")]
    WriterClosed(LogicalEndpoint),

    #[error("outbound stream to {url} is closed")]
    StreamClosed { url: String },

    #[error("unable to encode record: {0}")]
    Encode(String),

    #[error("invalid data client configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DataClientError>;

impl DataClientError {
    pub(crate) fn stream_closed(url: &str) -> Self {
        Self::StreamClosed {
            url: url.to_string(),
        }
    }
}
