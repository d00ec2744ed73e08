#![forbid(unsafe_code)]

use crate::tcf::crc::crc32;
use crate::tcf::error::{TcfError, TcfResult};

/// TCF header magic.
pub const MAGIC: [u8; 3] = *b"TCF";

/// End-of-archive marker. Advisory: readers never require it.
pub const FOOTER_MAGIC: [u8; 3] = *b"EOF";

pub const VERSION: u8 = 1;

/// Only little-endian archives exist.
pub const ENDIAN_LITTLE: u8 = 0;

pub const HEADER_LEN: usize = 18;

/// Bytes covered by the header CRC.
pub const HEADER_CRC_SPAN: usize = 14;

/// Chunk size for streaming payload bytes in and out.
pub const BUFFER_SIZE: usize = 8192;

/// Parsed TCF header.
///
/// Layout (little-endian):
/// - [magic 3]
/// - [u8 version]
/// - [u8 reserved]
/// - [u8 endianness]
/// - [u32 index_offset] absolute
/// - [u32 entry_count]
/// - [u32 header_crc] over bytes 0..14
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub reserved: u8,
    pub endianness: u8,
    pub index_offset: u32,
    pub entry_count: u32,
    pub header_crc: u32,
}

impl Header {
    pub fn new(index_offset: u32, entry_count: u32) -> Self {
        let mut h = Header {
            version: VERSION,
            reserved: 0,
            endianness: ENDIAN_LITTLE,
            index_offset,
            entry_count,
            header_crc: 0,
        };
        h.header_crc = crc32(&h.to_bytes()[..HEADER_CRC_SPAN]);
        h
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut b = [0u8; HEADER_LEN];
        b[0..3].copy_from_slice(&MAGIC);
        b[3] = self.version;
        b[4] = self.reserved;
        b[5] = self.endianness;
        b[6..10].copy_from_slice(&self.index_offset.to_le_bytes());
        b[10..14].copy_from_slice(&self.entry_count.to_le_bytes());
        b[14..18].copy_from_slice(&self.header_crc.to_le_bytes());
        b
    }

    /// Validates magic, then CRC, then the remaining fixed fields.
    ///
    /// The CRC is checked before any field is trusted so a flipped bit in the
    /// version or reserved bytes reports as an integrity failure.
    pub fn parse(b: &[u8; HEADER_LEN]) -> TcfResult<Self> {
        if b[0..3] != MAGIC {
            return Err(TcfError::Format("bad header magic".into()));
        }

        let field = |at: usize| u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]);
        let h = Header {
            version: b[3],
            reserved: b[4],
            endianness: b[5],
            index_offset: field(6),
            entry_count: field(10),
            header_crc: field(14),
        };

        let computed = crc32(&b[..HEADER_CRC_SPAN]);
        if computed != h.header_crc {
            return Err(TcfError::Integrity {
                stored: h.header_crc,
                computed,
            });
        }

        if h.version != VERSION {
            return Err(TcfError::Format(format!("unsupported version {}", h.version)));
        }

        if h.reserved != 0 || h.endianness != ENDIAN_LITTLE {
            return Err(TcfError::Format(format!(
                "unsupported flags (reserved {}, endianness {})",
                h.reserved, h.endianness
            )));
        }

        if (h.index_offset as usize) < HEADER_LEN {
            return Err(TcfError::Format(format!(
                "index offset {} inside header",
                h.index_offset
            )));
        }

        Ok(h)
    }

    /// Length of the payload region between header and index.
    pub fn payload_len(&self) -> usize {
        self.index_offset as usize - HEADER_LEN
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub path: String,
    /// Payload-relative.
    pub offset: u32,
    /// Original (untransformed) size; equal to the stored size.
    pub size: u32,
}

impl Entry {
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }

    pub fn into_info(self) -> EntryInfo {
        EntryInfo {
            path: self.path,
            offset: self.offset,
            size: self.size,
        }
    }
}

/// Public view of a TCF entry (for listings and inspectors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub path: String,
    pub offset: u32,
    pub size: u32,
}
