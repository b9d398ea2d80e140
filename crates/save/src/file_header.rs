// ---------------------------------------------------------------------------
// file_header – Rail save header with magic bytes, version, and checksum
// ---------------------------------------------------------------------------
//
// Header format (24 bytes, fixed-size, little-endian):
//   [0..4]   Magic bytes: "RAIL"
//   [4..8]   Header format version (u32)
//   [8..12]  Flags (u32: bit 0 = LZ4 compressed)
//   [12..16] Uncompressed data size (u32)
//   [16..20] Payload size (u32)
//   [20..24] xxHash32 checksum of the payload (everything after the header)
//
// On save: encode SaveData -> compress -> prepend header
// On load: check magic -> check sizes and checksum -> decompress -> decode

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

pub const MAGIC: [u8; 4] = *b"RAIL";

pub const HEADER_SIZE: usize = 24;

/// Version of the header layout itself, distinct from the `SaveData` version.
pub const HEADER_FORMAT_VERSION: u32 = 1;

pub const FLAG_COMPRESSED: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// Largest decompressed payload a header may announce.
pub const MAX_UNCOMPRESSED_SIZE: u32 = 256 * 1024 * 1024;

/// LZ4 block output never exceeds this multiple of its input.
const LZ4_MAX_RATIO: u64 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub format_version: u32,
    pub flags: u32,
    pub uncompressed_size: u32,
    pub payload_size: u32,
    pub checksum: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        out[8..12].copy_from_slice(&self.flags.to_le_bytes());
        out[12..16].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        out[16..20].copy_from_slice(&self.payload_size.to_le_bytes());
        out[20..24].copy_from_slice(&self.checksum.to_le_bytes());
        out
    }
}

fn size_field(len: usize, what: &str) -> Result<u32, SaveError> {
    u32::try_from(len)
        .map_err(|_| SaveError::Encode(format!("{what} of {len} bytes does not fit the header")))
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Compress `data` with LZ4 and prepend a header.
pub fn wrap_compressed(data: &[u8]) -> Result<Vec<u8>, SaveError> {
    let payload = lz4_flex::block::compress(data);
    wrap(data.len(), FLAG_COMPRESSED, &payload)
}

/// Prepend a header to `data` as-is.
pub fn wrap_uncompressed(data: &[u8]) -> Result<Vec<u8>, SaveError> {
    wrap(data.len(), 0, data)
}

fn wrap(uncompressed_len: usize, flags: u32, payload: &[u8]) -> Result<Vec<u8>, SaveError> {
    let header = FileHeader {
        format_version: HEADER_FORMAT_VERSION,
        flags,
        uncompressed_size: size_field(uncompressed_len, "save data")?,
        payload_size: size_field(payload.len(), "payload")?,
        checksum: xxh32(payload, XXHASH_SEED),
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Parse and validate the header, returning it with the payload bytes.
///
/// # Errors
///
/// - `Corrupted` for a missing magic, a short file, a payload size that
///   disagrees with the file length, or a checksum mismatch
/// - `VersionMismatch` for a header layout from a newer build
pub fn unwrap_header(bytes: &[u8]) -> Result<(FileHeader, &[u8]), SaveError> {
    if bytes.len() < MAGIC.len() || bytes[..4] != MAGIC {
        return Err(SaveError::Corrupted("not a rail save (bad magic)".to_string()));
    }
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::Corrupted(format!(
            "file is {} bytes, shorter than the {HEADER_SIZE}-byte header",
            bytes.len()
        )));
    }

    let header = FileHeader {
        format_version: read_u32(bytes, 4),
        flags: read_u32(bytes, 8),
        uncompressed_size: read_u32(bytes, 12),
        payload_size: read_u32(bytes, 16),
        checksum: read_u32(bytes, 20),
    };

    if header.format_version > HEADER_FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: HEADER_FORMAT_VERSION,
            found: header.format_version,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != header.payload_size as usize {
        return Err(SaveError::Corrupted(format!(
            "payload is {} bytes, header says {}",
            payload.len(),
            header.payload_size
        )));
    }

    let computed = xxh32(payload, XXHASH_SEED);
    if computed != header.checksum {
        return Err(SaveError::Corrupted(format!(
            "checksum mismatch (expected {:#010X}, got {computed:#010X})",
            header.checksum
        )));
    }

    Ok((header, payload))
}

/// The encoded save data behind a validated header.
pub fn unwrap_payload(bytes: &[u8]) -> Result<Vec<u8>, SaveError> {
    let (header, payload) = unwrap_header(bytes)?;
    if !header.is_compressed() {
        return Ok(payload.to_vec());
    }
    let announced = u64::from(header.uncompressed_size);
    if header.uncompressed_size > MAX_UNCOMPRESSED_SIZE
        || announced > payload.len() as u64 * LZ4_MAX_RATIO
    {
        return Err(SaveError::Corrupted(format!(
            "uncompressed size {} exceeds what a {}-byte payload can hold",
            header.uncompressed_size,
            payload.len()
        )));
    }
    let data = lz4_flex::block::decompress(payload, header.uncompressed_size as usize)?;
    if data.len() != header.uncompressed_size as usize {
        return Err(SaveError::Corrupted(format!(
            "decompressed to {} bytes, header says {}",
            data.len(),
            header.uncompressed_size
        )));
    }
    Ok(data)
}
