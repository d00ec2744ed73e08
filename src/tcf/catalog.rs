#![forbid(unsafe_code)]

use std::io::{Read, Write};

use crate::tcf::error::{TcfError, TcfResult};
use crate::tcf::format::{Entry, HEADER_LEN};
use crate::tcf::io::{read_u16, read_u32, truncated, write_u16, write_u32};

/// Ordered list of archive entries, in payload order.
///
/// Paths are not deduplicated: a repeated path yields a repeated index record.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    entries: Vec<Entry>,
    payload_len: u64,
}

impl Catalog {
    pub fn with_capacity(n: usize) -> Self {
        Catalog {
            entries: Vec::with_capacity(n),
            payload_len: 0,
        }
    }

    /// Appends an entry at the current end of the payload and returns its offset.
    pub fn push(&mut self, path: String, size: u32) -> TcfResult<u32> {
        let offset = u32::try_from(self.payload_len)
            .map_err(|_| TcfError::TooLarge(format!("payload offset for {path}")))?;
        self.payload_len += size as u64;
        self.entries.push(Entry { path, offset, size });
        Ok(offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all original sizes.
    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Entry count as stored in the header.
    pub fn count_u32(&self) -> TcfResult<u32> {
        u32::try_from(self.entries.len()).map_err(|_| TcfError::TooManyEntries(self.entries.len()))
    }

    /// Where the index starts once the payload follows the header.
    pub fn index_offset(&self) -> TcfResult<u32> {
        let end = HEADER_LEN as u64 + self.payload_len;
        u32::try_from(end).map_err(|_| TcfError::TooLarge(format!("index offset {end}")))
    }

    /// Index record: [u16 path_len][path bytes][u32 offset][u32 size].
    pub fn write_index(&self, w: &mut dyn Write) -> TcfResult<()> {
        for e in &self.entries {
            write_record(w, e)?;
        }
        Ok(())
    }
}

pub(crate) fn write_record(w: &mut dyn Write, e: &Entry) -> TcfResult<()> {
    let p = e.path.as_bytes();
    let len = u16::try_from(p.len())
        .map_err(|_| TcfError::Format(format!("path too long: {}", e.path)))?;
    write_u16(w, len)?;
    w.write_all(p)?;
    write_u32(w, e.offset)?;
    write_u32(w, e.size)?;
    Ok(())
}

/// Reads one index record. Truncation and non-UTF-8 paths are format errors.
pub(crate) fn read_record(r: &mut dyn Read) -> TcfResult<Entry> {
    truncated(read_record_raw(r), "index")
}

fn read_record_raw(r: &mut dyn Read) -> TcfResult<Entry> {
    let path_len = read_u16(r)? as usize;
    let mut path_bytes = Vec::new();
    path_bytes
        .try_reserve_exact(path_len)
        .map_err(|_| TcfError::Memory(path_len))?;
    path_bytes.resize(path_len, 0);
    r.read_exact(&mut path_bytes)?;
    let path =
        String::from_utf8(path_bytes).map_err(|_| TcfError::Format("path is not utf8".into()))?;

    let offset = read_u32(r)?;
    let size = read_u32(r)?;

    Ok(Entry { path, offset, size })
}

impl FromIterator<Entry> for Catalog {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let entries: Vec<Entry> = iter.into_iter().collect();
        let payload_len = entries.iter().map(|e| e.size as u64).sum();
        Catalog {
            entries,
            payload_len,
        }
    }
}
