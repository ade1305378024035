//! Buffered writer for one outbound logical stream.

use crate::codec::Codec;
use crate::error::{DataClientError, Result};
use crate::model::elements::{DataChunk, Elements};
use crate::model::logical_endpoint::LogicalEndpoint;
use crate::multiplexer::OutboundSink;
use crate::observability::events;
use bytes::BytesMut;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "outbound_writer";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriterState {
    Open,
    Closed,
}

/// Writes encoded records for one [`LogicalEndpoint`] onto a multiplexer's
/// shared sink.
///
/// Records accumulate in a local buffer and go out as one data chunk whenever
/// the buffer reaches the configured limit. [`close`](Self::close) flushes what
/// is left and then sends the single terminal chunk for the endpoint.
///
/// The writer is owned by one caller; every mutating method takes `&mut self`.
/// Creating it performs no I/O.
pub struct OutboundWriter<T> {
    endpoint: LogicalEndpoint,
    codec: Arc<dyn Codec<T>>,
    sink: Arc<dyn OutboundSink>,
    buffer: BytesMut,
    buffer_limit: usize,
    state: WriterState,
    bytes_written: u64,
    records_written: u64,
}

impl<T> OutboundWriter<T> {
    pub(crate) fn new(
        endpoint: LogicalEndpoint,
        codec: Arc<dyn Codec<T>>,
        sink: Arc<dyn OutboundSink>,
        buffer_limit: usize,
    ) -> Self {
        Self {
            endpoint,
            codec,
            sink,
            buffer: BytesMut::new(),
            buffer_limit: buffer_limit.max(1),
            state: WriterState::Open,
            bytes_written: 0,
            records_written: 0,
        }
    }

    pub fn endpoint(&self) -> &LogicalEndpoint {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.state == WriterState::Closed
    }

    /// Bytes handed to the sink so far, excluding what is still buffered.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Records accepted by [`write`](Self::write), buffered or not.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Closed => Err(DataClientError::WriterClosed(self.endpoint.clone())),
        }
    }

    /// Encodes `record` into the buffer, flushing once the buffer limit is
    /// reached.
    ///
    /// A record that fails to encode leaves the buffer as it was. If the flush
    /// fails, the record stays accepted and the buffered bytes are kept for the
    /// next flush or close.
    pub async fn write(&mut self, record: &T) -> Result<()> {
        self.ensure_open()?;

        let mark = self.buffer.len();
        if let Err(err) = self.codec.encode(record, &mut self.buffer) {
            self.buffer.truncate(mark);
            return Err(err);
        }
        self.records_written += 1;

        if self.buffer.len() >= self.buffer_limit {
            self.flush_buffer().await?;
        }
        Ok(())
    }

    /// Sends any buffered bytes as one data chunk.
    pub async fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flush_buffer().await
    }

    async fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let payload = self.buffer.split().freeze();
        let payload_bytes = payload.len();
        debug!(
            event = events::OUTBOUND_FLUSH,
            component = COMPONENT,
            endpoint = %self.endpoint,
            payload_bytes,
            "flushing outbound chunk"
        );
        let sent = self
            .sink
            .send(Elements::single(DataChunk::data(
                self.endpoint.clone(),
                payload.clone(),
            )))
            .await;
        if let Err(err) = sent {
            self.buffer.extend_from_slice(&payload);
            return Err(err);
        }
        self.bytes_written += payload_bytes as u64;
        Ok(())
    }

    /// Flushes buffered records, then signals end of stream with one empty
    /// terminal chunk.
    ///
    /// The writer is closed from the first call on, even when sending fails;
    /// later calls to `write`, `flush` or `close` return
    /// [`DataClientError::WriterClosed`] without touching the sink.
    pub async fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.state = WriterState::Closed;

        self.flush_buffer().await?;
        self.sink
            .send(Elements::single(DataChunk::terminal(self.endpoint.clone())))
            .await?;

        debug!(
            event = events::OUTBOUND_TERMINAL,
            component = COMPONENT,
            endpoint = %self.endpoint,
            records = self.records_written,
            bytes = self.bytes_written,
            "closed outbound stream"
        );
        Ok(())
    }
}

impl<T> Drop for OutboundWriter<T> {
    fn drop(&mut self) {
        if self.state == WriterState::Open {
            warn!(
                event = events::OUTBOUND_DROPPED_OPEN,
                component = COMPONENT,
                endpoint = %self.endpoint,
                buffered_bytes = self.buffer.len(),
                "outbound writer dropped without close; no end-of-stream sent"
            );
        }
    }
}
