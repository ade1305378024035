use crate::model::elements::Elements;

/// Comma-separated logical endpoints carried by a batch, for log fields.
pub fn format_chunk_endpoints(elements: &Elements) -> String {
    elements
        .data
        .iter()
        .map(|chunk| chunk.endpoint.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn payload_bytes(elements: &Elements) -> usize {
    elements.data.iter().map(|chunk| chunk.payload.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::{format_chunk_endpoints, payload_bytes};
    use crate::model::elements::{DataChunk, Elements};
    use crate::model::logical_endpoint::LogicalEndpoint;
    use bytes::Bytes;

    #[test]
    fn summarizes_batch() {
        let elements = Elements::new(vec![
            DataChunk::data(LogicalEndpoint::data("i1", "a"), Bytes::from_static(b"abc")),
            DataChunk::terminal(LogicalEndpoint::data("i1", "b")),
        ]);

        assert_eq!(
            format_chunk_endpoints(&elements),
            "[instruction: i1, transform: a],[instruction: i1, transform: b]"
        );
        assert_eq!(payload_bytes(&elements), 3);
    }
}
