//! Byte form of wire values for storage.
//!
//! Two layouts, auto-detected on read:
//! - `WBE1` + JSON text
//! - `WBEZ` + varint uncompressed size + zstd frame of the JSON text

use std::io::Read;

use crate::error::BlobError;
use crate::limits::{
    DEFAULT_COMPRESSION_LEVEL, MAGIC_COMPRESSED, MAGIC_UNCOMPRESSED, MAX_BLOB_SIZE,
    MAX_VARINT_BYTES,
};
use crate::registry::WireValue;

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a blob in either layout back to a wire value.
pub fn decode_blob(input: &[u8]) -> Result<WireValue, BlobError> {
    if input.len() < 4 {
        return Err(BlobError::UnexpectedEof { context: "magic" });
    }

    let (magic, body) = input.split_at(4);
    if magic == MAGIC_COMPRESSED {
        let json = decompress_zstd(body)?;
        Ok(serde_json::from_slice(&json)?)
    } else if magic == MAGIC_UNCOMPRESSED {
        if body.len() > MAX_BLOB_SIZE {
            return Err(BlobError::LengthExceedsLimit {
                field: "blob",
                len: body.len(),
                max: MAX_BLOB_SIZE,
            });
        }
        Ok(serde_json::from_slice(body)?)
    } else {
        Err(BlobError::InvalidMagic {
            found: magic.to_vec(),
        })
    }
}

/// Returns the JSON bytes of a `WBEZ` blob.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, BlobError> {
    if input.len() < 4 {
        return Err(BlobError::UnexpectedEof { context: "magic" });
    }
    if &input[0..4] != MAGIC_COMPRESSED {
        return Err(BlobError::InvalidMagic {
            found: input[0..4].to_vec(),
        });
    }
    decompress_zstd(&input[4..])
}

fn decompress_zstd(body: &[u8]) -> Result<Vec<u8>, BlobError> {
    let (declared_size, consumed) = read_varint(body, "uncompressed_size")?;
    let declared_size = usize::try_from(declared_size).unwrap_or(usize::MAX);

    if declared_size > MAX_BLOB_SIZE {
        return Err(BlobError::LengthExceedsLimit {
            field: "uncompressed_size",
            len: declared_size,
            max: MAX_BLOB_SIZE,
        });
    }

    let decoder = zstd::Decoder::new(&body[consumed..])
        .map_err(|e| BlobError::DecompressionFailed(e.to_string()))?;

    // Read one byte past the declared size so an oversized frame is detected
    // without unbounded allocation.
    let mut decompressed = Vec::with_capacity(declared_size);
    decoder
        .take(declared_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| BlobError::DecompressionFailed(e.to_string()))?;

    if decompressed.len() != declared_size {
        return Err(BlobError::UncompressedSizeMismatch {
            declared: declared_size,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}

fn read_varint(input: &[u8], context: &'static str) -> Result<(u64, usize), BlobError> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in input.iter().take(MAX_VARINT_BYTES).enumerate() {
        let value = u64::from(byte & 0x7F);
        if shift == 63 && value > 1 {
            return Err(BlobError::VarintTooLong);
        }
        result |= value << shift;
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }

    if input.len() >= MAX_VARINT_BYTES {
        Err(BlobError::VarintTooLong)
    } else {
        Err(BlobError::UnexpectedEof { context })
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a wire value as an uncompressed `WBE1` blob.
pub fn encode_blob(wire: &WireValue) -> Result<Vec<u8>, BlobError> {
    let json = serde_json::to_vec(wire)?;
    let mut out = Vec::with_capacity(4 + json.len());
    out.extend_from_slice(MAGIC_UNCOMPRESSED);
    out.extend_from_slice(&json);
    Ok(out)
}

/// Encodes a wire value as a `WBEZ` blob at the default level.
pub fn encode_blob_compressed(wire: &WireValue) -> Result<Vec<u8>, BlobError> {
    encode_blob_compressed_with_level(wire, DEFAULT_COMPRESSION_LEVEL)
}

/// Encodes a wire value as a `WBEZ` blob at the given zstd level.
pub fn encode_blob_compressed_with_level(wire: &WireValue, level: i32) -> Result<Vec<u8>, BlobError> {
    let json = serde_json::to_vec(wire)?;
    if json.len() > MAX_BLOB_SIZE {
        return Err(BlobError::LengthExceedsLimit {
            field: "blob",
            len: json.len(),
            max: MAX_BLOB_SIZE,
        });
    }

    let compressed = zstd::encode_all(json.as_slice(), level)
        .map_err(|e| BlobError::CompressionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(4 + MAX_VARINT_BYTES + compressed.len());
    out.extend_from_slice(MAGIC_COMPRESSED);
    write_varint(&mut out, json.len() as u64);
    out.extend_from_slice(&compressed);
    Ok(out)
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> WireValue {
        json!({
            "type": "item",
            "id": "Q42",
            "labels": {"en": {"language": "en", "value": "Douglas Adams"}},
            "descriptions": {},
            "aliases": {},
            "claims": {},
            "sitelinks": {}
        })
    }

    #[test]
    fn test_uncompressed_blob() {
        let blob = encode_blob(&sample()).unwrap();
        assert_eq!(&blob[0..4], MAGIC_UNCOMPRESSED);
        assert_eq!(decode_blob(&blob).unwrap(), sample());
    }

    #[test]
    fn test_compressed_blob() {
        let blob = encode_blob_compressed(&sample()).unwrap();
        assert_eq!(&blob[0..4], MAGIC_COMPRESSED);
        assert_eq!(decode_blob(&blob).unwrap(), sample());

        let json = decompress(&blob).unwrap();
        assert_eq!(json, serde_json::to_vec(&sample()).unwrap());
    }

    #[test]
    fn test_compressed_smaller_for_repetitive_input() {
        let labels: serde_json::Map<_, _> = (0..200)
            .map(|i| {
                let lang = format!("l{i}");
                (lang.clone(), json!({"language": lang, "value": "Douglas Adams"}))
            })
            .collect();
        let wire = json!({"labels": labels});
        let plain = encode_blob(&wire).unwrap();
        let compressed = encode_blob_compressed(&wire).unwrap();
        assert!(compressed.len() < plain.len());
    }

    #[test]
    fn test_invalid_magic() {
        let result = decode_blob(b"JSON{}");
        assert!(matches!(result, Err(BlobError::InvalidMagic { .. })));
        assert!(matches!(
            decode_blob(b"WB"),
            Err(BlobError::UnexpectedEof { context: "magic" })
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let mut blob = encode_blob_compressed(&sample()).unwrap();
        // Low 7 bits of the declared size; the sample is not a multiple of 128.
        blob[4] -= 1;
        assert!(matches!(
            decode_blob(&blob),
            Err(BlobError::UncompressedSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_declared_size_limit() {
        let mut blob = MAGIC_COMPRESSED.to_vec();
        write_varint(&mut blob, MAX_BLOB_SIZE as u64 + 1);
        assert!(matches!(
            decode_blob(&blob),
            Err(BlobError::LengthExceedsLimit { field: "uncompressed_size", .. })
        ));
    }

    #[test]
    fn test_varint_roundtrip() {
        for v in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, v);
            assert_eq!(read_varint(&buf, "test").unwrap(), (v, buf.len()));
        }
        assert!(matches!(read_varint(&[0x80], "test"), Err(BlobError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let mut blob = MAGIC_UNCOMPRESSED.to_vec();
        blob.extend_from_slice(b"{not json");
        assert!(matches!(decode_blob(&blob), Err(BlobError::Json(_))));
    }
}
