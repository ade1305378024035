//! Record encoders used by outbound writers.
//!
//! The data plane never decodes what it sends. A codec only has to append a
//! self-delimiting encoding of one record to the writer's buffer.

use crate::error::{DataClientError, Result};
use bytes::{BufMut, BytesMut};
use serde::Serialize;
use std::marker::PhantomData;

pub trait Codec<T>: Send + Sync {
    fn encode(&self, record: &T, out: &mut BytesMut) -> Result<()>;
}

fn put_length_prefixed(bytes: &[u8], out: &mut BytesMut) -> Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        DataClientError::Encode(format!("record of {} bytes exceeds u32 length", bytes.len()))
    })?;
    out.reserve(4 + bytes.len());
    out.put_u32(len);
    out.put_slice(bytes);
    Ok(())
}

/// Raw bytes behind a big-endian `u32` length.
#[derive(Clone, Copy, Debug, Default)]
pub struct LengthPrefixedBytesCodec;

impl<T: AsRef<[u8]>> Codec<T> for LengthPrefixedBytesCodec {
    fn encode(&self, record: &T, out: &mut BytesMut) -> Result<()> {
        put_length_prefixed(record.as_ref(), out)
    }
}

/// UTF-8 text behind a big-endian `u32` length.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8StringCodec;

impl Codec<String> for Utf8StringCodec {
    fn encode(&self, record: &String, out: &mut BytesMut) -> Result<()> {
        put_length_prefixed(record.as_bytes(), out)
    }
}

impl Codec<&str> for Utf8StringCodec {
    fn encode(&self, record: &&str, out: &mut BytesMut) -> Result<()> {
        put_length_prefixed(record.as_bytes(), out)
    }
}

/// A `serde_json` document behind a big-endian `u32` length.
pub struct JsonCodec<T> {
    _record: PhantomData<fn(&T)>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Codec<T> for JsonCodec<T> {
    fn encode(&self, record: &T, out: &mut BytesMut) -> Result<()> {
        let json = serde_json::to_vec(record).map_err(|e| DataClientError::Encode(e.to_string()))?;
        put_length_prefixed(&json, out)
    }
}

#[cfg(test)]
mod tests {
    use super::{Codec, JsonCodec, LengthPrefixedBytesCodec, Utf8StringCodec};
    use bytes::BytesMut;
    use serde::Serialize;

    #[test]
    fn bytes_codec_prefixes_length() {
        let mut out = BytesMut::new();
        LengthPrefixedBytesCodec
            .encode(&vec![0xAAu8, 0xBB], &mut out)
            .expect("encode");

        assert_eq!(&out[..], &[0, 0, 0, 2, 0xAA, 0xBB]);
    }

    #[test]
    fn string_codec_appends_records() {
        let mut out = BytesMut::new();
        Utf8StringCodec.encode(&"ab", &mut out).expect("encode");
        Utf8StringCodec
            .encode(&"c".to_string(), &mut out)
            .expect("encode");

        assert_eq!(&out[..], b"\0\0\0\x02ab\0\0\0\x01c");
    }

    #[test]
    fn json_codec_writes_document() {
        #[derive(Serialize)]
        struct Count {
            word: &'static str,
            n: u32,
        }

        let mut out = BytesMut::new();
        JsonCodec::new()
            .encode(&Count { word: "river", n: 3 }, &mut out)
            .expect("encode");

        let body = br#"{"word":"river","n":3}"#;
        assert_eq!(&out[..4], &(body.len() as u32).to_be_bytes());
        assert_eq!(&out[4..], body);
    }
}
