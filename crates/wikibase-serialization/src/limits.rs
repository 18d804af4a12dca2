//! Limits and magic bytes for the blob storage format.

/// Magic bytes of an uncompressed blob (followed by JSON).
pub const MAGIC_UNCOMPRESSED: &[u8; 4] = b"WBE1";

/// Magic bytes of a compressed blob (followed by varint size and a zstd frame).
pub const MAGIC_COMPRESSED: &[u8; 4] = b"WBEZ";

/// Maximum size in bytes of a blob payload after decompression.
pub const MAX_BLOB_SIZE: usize = 64 * 1024 * 1024;

/// Maximum encoded length of a varint.
pub const MAX_VARINT_BYTES: usize = 10;

/// Default zstd compression level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
