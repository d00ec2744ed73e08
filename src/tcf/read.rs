#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::tcf::catalog::{read_record, Catalog};
use crate::tcf::error::{TcfError, TcfResult};
use crate::tcf::format::{Entry, Header, HEADER_LEN};
use crate::tcf::io::{read_exact, truncated};

pub(crate) fn open_archive(path: &Path) -> TcfResult<(BufReader<File>, Header)> {
    let mut r = BufReader::new(File::open(path)?);
    let header = read_header(&mut r)?;
    Ok((r, header))
}

/// Reads and validates the fixed header. A short read is a format error.
pub(crate) fn read_header(r: &mut dyn Read) -> TcfResult<Header> {
    let raw = truncated(read_exact::<HEADER_LEN>(r), "header")?;
    Header::parse(&raw)
}

/// The payload the header claims must be present in a file of `file_len` bytes.
pub(crate) fn check_payload_present(header: &Header, file_len: u64) -> TcfResult<()> {
    if header.index_offset as u64 > file_len {
        return Err(TcfError::Io(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!(
                "payload ends at {} but file is {file_len} bytes",
                header.index_offset
            ),
        )));
    }
    Ok(())
}

/// Loads the whole payload region. The reader must sit right after the header.
///
/// The buffer only grows as bytes arrive, so a short file fails with
/// `UnexpectedEof` without touching the full claimed length.
pub(crate) fn read_payload(r: &mut dyn Read, header: &Header) -> TcfResult<Vec<u8>> {
    let len = header.payload_len();
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(len)
        .map_err(|_| TcfError::Memory(len))?;
    let got = r.take(len as u64).read_to_end(&mut payload)?;
    if got != len {
        return Err(TcfError::Io(io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("payload is {got} of {len} bytes"),
        )));
    }
    Ok(payload)
}

/// Reads `entry_count` index records. The reader must sit at the index offset.
pub(crate) fn read_index(r: &mut dyn Read, header: &Header) -> TcfResult<Catalog> {
    (0..header.entry_count)
        .map(|_| read_record(&mut *r))
        .collect()
}

/// Header plus index, without loading the payload.
pub(crate) fn read_catalog(path: &Path) -> TcfResult<(Header, Catalog)> {
    let (mut r, header) = open_archive(path)?;
    r.seek(SeekFrom::Start(header.index_offset as u64))?;
    let catalog = read_index(&mut r, &header)?;
    Ok((header, catalog))
}

/// Entry must lie inside a payload of `payload_len` bytes.
pub(crate) fn check_bounds(e: &Entry, payload_len: usize) -> TcfResult<()> {
    if e.end() > payload_len as u64 {
        return Err(TcfError::Format(format!(
            "entry {} ({}+{}) outside payload of {} bytes",
            e.path, e.offset, e.size, payload_len
        )));
    }
    Ok(())
}
