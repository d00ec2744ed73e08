#![forbid(unsafe_code)]

/// CRC-32 (IEEE, reflected 0xEDB88320, init 0xFFFFFFFF, final xor).
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}
