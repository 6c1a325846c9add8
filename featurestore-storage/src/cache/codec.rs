//! Compact binary encoding for cached feature records.
//!
//! The wire format is intentionally small and self-describing rather than
//! using a general-purpose serializer: cache entries are read and written far
//! more often than any other record in the system, so a tagged, fixed-layout
//! binary format avoids both the size and the schema evolution cost of JSON.
//!
//! ```text
//! record    := value timestamp_millis:i64 freshness_seconds:i64
//! value     := tag:u8 payload
//! tag 0     := null                     (no payload)
//! tag 1     := float64                  (8 bytes, LE)
//! tag 2     := int64                    (8 bytes, LE)
//! tag 3     := string                   (len:u32 LE, utf8 bytes)
//! tag 4     := bool                     (1 byte, 0 or 1)
//! ```
//!
//! Cache entries carry no metadata map — that lives only in the durable
//! store's [`featurestore_core::StoredFeatureValue`].

use featurestore_core::{CachedFeature, FeatureValueData};
use std::convert::TryInto;

/// Failure to decode a cache payload back into a [`CachedFeature`].
///
/// The serving engine never treats this as fatal — it is converted to a
/// cache miss at the cache-backend boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("cache entry truncated: expected at least {expected} more bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("cache entry has unknown value tag {0}")]
    InvalidTag(u8),

    #[error("cache entry string bytes are not valid utf-8")]
    InvalidUtf8,
}

const TAG_NULL: u8 = 0;
const TAG_FLOAT64: u8 = 1;
const TAG_INT64: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_BOOL: u8 = 4;

/// Encode a [`CachedFeature`] into the compact tagged binary format.
pub fn encode(record: &CachedFeature) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    encode_value(&record.value, &mut buf);
    buf.extend_from_slice(&record.timestamp.timestamp_millis().to_le_bytes());
    buf.extend_from_slice(&record.freshness_seconds.to_le_bytes());
    buf
}

fn encode_value(value: &FeatureValueData, buf: &mut Vec<u8>) {
    match value {
        FeatureValueData::Null => buf.push(TAG_NULL),
        FeatureValueData::Float64(v) => {
            buf.push(TAG_FLOAT64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        FeatureValueData::Int64(v) => {
            buf.push(TAG_INT64);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        FeatureValueData::String(s) => {
            buf.push(TAG_STRING);
            buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        FeatureValueData::Bool(b) => {
            buf.push(TAG_BOOL);
            buf.push(if *b { 1 } else { 0 });
        }
    }
}

/// Decode a cache payload previously produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<CachedFeature, CodecError> {
    let mut cursor = Cursor::new(bytes);
    let value = decode_value(&mut cursor)?;
    let millis = cursor.read_i64()?;
    let freshness_seconds = cursor.read_i64()?;
    let timestamp = chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(chrono::Utc::now);
    Ok(CachedFeature {
        value,
        timestamp,
        freshness_seconds,
    })
}

fn decode_value(cursor: &mut Cursor) -> Result<FeatureValueData, CodecError> {
    let tag = cursor.read_u8()?;
    match tag {
        TAG_NULL => Ok(FeatureValueData::Null),
        TAG_FLOAT64 => Ok(FeatureValueData::Float64(cursor.read_f64()?)),
        TAG_INT64 => Ok(FeatureValueData::Int64(cursor.read_i64()?)),
        TAG_STRING => {
            let len = cursor.read_u32()? as usize;
            let bytes = cursor.read_bytes(len)?;
            let s = String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(FeatureValueData::String(s))
        }
        TAG_BOOL => Ok(FeatureValueData::Bool(cursor.read_u8()? != 0)),
        other => Err(CodecError::InvalidTag(other)),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.pos + n > self.bytes.len() {
            return Err(CodecError::Truncated {
                expected: n,
                found: self.bytes.len() - self.pos,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes: [u8; 4] = self.read_bytes(4)?.try_into().expect("exactly 4 bytes");
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_i64(&mut self) -> Result<i64, CodecError> {
        let bytes: [u8; 8] = self.read_bytes(8)?.try_into().expect("exactly 8 bytes");
        Ok(i64::from_le_bytes(bytes))
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        let bytes: [u8; 8] = self.read_bytes(8)?.try_into().expect("exactly 8 bytes");
        Ok(f64::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn roundtrip(value: FeatureValueData) {
        let record = CachedFeature {
            value,
            timestamp: Utc::now(),
            freshness_seconds: 7,
        };
        let bytes = encode(&record);
        let decoded = decode(&bytes).expect("decode should succeed");
        assert_eq!(decoded.value, record.value);
        assert_eq!(decoded.freshness_seconds, record.freshness_seconds);
        assert_eq!(
            decoded.timestamp.timestamp_millis(),
            record.timestamp.timestamp_millis()
        );
    }

    #[test]
    fn round_trips_every_dtype() {
        roundtrip(FeatureValueData::Float64(3.5));
        roundtrip(FeatureValueData::Int64(-42));
        roundtrip(FeatureValueData::String("hello".into()));
        roundtrip(FeatureValueData::Bool(true));
        roundtrip(FeatureValueData::Null);
    }

    #[test]
    fn truncated_input_is_reported_not_panicked() {
        let bytes = encode(&CachedFeature {
            value: FeatureValueData::String("this needs more bytes than we'll give it".into()),
            timestamp: Utc::now(),
            freshness_seconds: 0,
        });
        let truncated = &bytes[..bytes.len() - 4];
        assert!(matches!(
            decode(truncated),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes = vec![0xFF, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(decode(&bytes), Err(CodecError::InvalidTag(0xFF))));
    }

    #[test]
    fn empty_input_is_truncated_not_panicked() {
        assert!(matches!(decode(&[]), Err(CodecError::Truncated { .. })));
    }
}
