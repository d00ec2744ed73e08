#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::tcf::catalog::Catalog;
use crate::tcf::cipher::Cipher;
use crate::tcf::error::{TcfError, TcfResult};
use crate::tcf::format::{Header, BUFFER_SIZE, FOOTER_MAGIC, HEADER_LEN};
use crate::tcf::walk::walk;

/// Knobs for `pack_with`.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Skip files whose relative path contains any of these substrings.
    pub excludes: Vec<String>,
}

/// What a successful pack wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub entries: u32,
    pub payload_bytes: u64,
    pub index_offset: u32,
    pub archive_bytes: u64,
}

/// TCF v1 layout:
/// - header [18] (written last, over a zeroed placeholder)
/// - payload: every file's bytes through the forward cipher, in index order
/// - index:
///   - entries...
///     - [u16 path_len][path bytes UTF-8]
///     - [u32 offset] payload-relative
///     - [u32 size]
/// - footer: [b"EOF"]
///
/// Determinism rules:
/// - paths are normalized to forward slashes
/// - entries are sorted lexicographically by path bytes
pub fn pack_with(
    input: &Path,
    output: &Path,
    opts: &PackOptions,
    cipher: &Cipher,
) -> TcfResult<PackSummary> {
    if !std::fs::metadata(input)?.is_dir() {
        return Err(TcfError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a directory", input.display()),
        )));
    }
    let files = walk(input, &opts.excludes)?;

    let mut catalog = Catalog::with_capacity(files.len());
    for f in &files {
        catalog.push(f.rel_path.clone(), f.size)?;
    }
    let entry_count = catalog.count_u32()?;
    let index_offset = catalog.index_offset()?;

    let mut out = BufWriter::new(File::create(output)?);
    out.write_all(&[0u8; HEADER_LEN])?;

    let mut buf = vec![0u8; BUFFER_SIZE];
    for (f, e) in files.iter().zip(catalog.entries()) {
        let mut src = File::open(&f.abs_path)?;
        let copied = copy_encoded(&mut src, &mut out, &mut buf, cipher)?;
        if copied != e.size as u64 {
            return Err(TcfError::Io(std::io::Error::other(format!(
                "{} changed during pack ({} bytes walked, {} read)",
                e.path, e.size, copied
            ))));
        }
        debug!(path = %e.path, offset = e.offset, size = e.size, "stored");
    }

    catalog.write_index(&mut out)?;
    out.write_all(&FOOTER_MAGIC)?;
    let archive_bytes = out.stream_position()?;

    let header = Header::new(index_offset, entry_count);
    out.seek(SeekFrom::Start(0))?;
    out.write_all(&header.to_bytes())?;
    out.flush()?;

    let summary = PackSummary {
        entries: entry_count,
        payload_bytes: catalog.payload_len(),
        index_offset,
        archive_bytes,
    };
    info!(
        input = %input.display(),
        output = %output.display(),
        entries = summary.entries,
        payload = summary.payload_bytes,
        "packed"
    );
    Ok(summary)
}

/// Streams `src` through the forward cipher into `out`, returning the byte count.
fn copy_encoded(
    src: &mut dyn Read,
    out: &mut dyn Write,
    buf: &mut [u8],
    cipher: &Cipher,
) -> TcfResult<u64> {
    let mut total = 0u64;
    loop {
        let n = match src.read(buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        cipher.encode_in_place(&mut buf[..n]);
        out.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}
