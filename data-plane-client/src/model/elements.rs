//! Batches exchanged with a multiplexer.

use crate::model::instruction::InstructionId;
use crate::model::logical_endpoint::LogicalEndpoint;
use bytes::Bytes;

/// Encoded records for one logical endpoint.
///
/// A chunk with `is_last` set and an empty payload marks the end of its
/// logical stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataChunk {
    pub endpoint: LogicalEndpoint,
    pub payload: Bytes,
    pub is_last: bool,
}

impl DataChunk {
    pub fn data(endpoint: LogicalEndpoint, payload: Bytes) -> Self {
        Self {
            endpoint,
            payload,
            is_last: false,
        }
    }

    pub fn terminal(endpoint: LogicalEndpoint) -> Self {
        Self {
            endpoint,
            payload: Bytes::new(),
            is_last: true,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.is_last && self.payload.is_empty()
    }
}

/// An ordered batch of chunks, possibly spanning several instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Elements {
    pub data: Vec<DataChunk>,
}

impl Elements {
    pub fn new(data: Vec<DataChunk>) -> Self {
        Self { data }
    }

    pub fn single(chunk: DataChunk) -> Self {
        Self { data: vec![chunk] }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Splits the batch into one batch per instruction.
    ///
    /// Instructions come out in order of first appearance and chunks keep their
    /// relative order within an instruction.
    pub fn split_by_instruction(self) -> Vec<(InstructionId, Elements)> {
        let mut groups: Vec<(InstructionId, Elements)> = Vec::new();
        for chunk in self.data {
            let instruction_id = chunk.endpoint.instruction_id();
            match groups.iter_mut().find(|(id, _)| id == instruction_id) {
                Some((_, group)) => group.data.push(chunk),
                None => {
                    let id = instruction_id.clone();
                    groups.push((id, Elements::single(chunk)));
                }
            }
        }
        groups
    }
}
