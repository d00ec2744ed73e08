#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::tcf::build::{pack_with, PackOptions, PackSummary};
use crate::tcf::catalog::read_record;
use crate::tcf::cipher::Cipher;
use crate::tcf::error::{TcfError, TcfResult};
use crate::tcf::format::{EntryInfo, BUFFER_SIZE, FOOTER_MAGIC, HEADER_LEN};
use crate::tcf::path::{
    ensure_directories, entry_destination, is_safe_entry_path, matches_filter,
};
use crate::tcf::read::{
    check_bounds, check_payload_present, open_archive, read_catalog, read_index, read_payload,
};

/// Pack `input` into a new archive at `output` with default options.
pub fn pack(input: &Path, output: &Path) -> TcfResult<PackSummary> {
    pack_with(input, output, &PackOptions::default(), &Cipher::TCF)
}

/// Knobs for `extract_with`.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only extract entries whose path contains one of these substrings.
    pub filter: Vec<String>,
    /// Fail on the first unsafe entry path instead of skipping it.
    pub strict: bool,
}

/// Per-entry outcome of an extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub extracted: Vec<String>,
    /// Entries refused by the path-safety check.
    pub skipped_unsafe: Vec<String>,
    /// Entries left out by `ExtractOptions::filter`.
    pub filtered: usize,
    pub bytes_written: u64,
}

/// Extract every entry of `archive` below `output` with default options.
pub fn extract(archive: &Path, output: &Path) -> TcfResult<ExtractReport> {
    extract_with(archive, output, &ExtractOptions::default(), &Cipher::TCF)
}

/// Validates the header, loads the payload, then streams the index.
///
/// A header that claims more payload than the file holds is an I/O error
/// before any of it is read.
///
/// Header problems fail before anything touches `output`. A destination that
/// cannot be written stops the run with `TcfError::Aborted`; files written up
/// to that point stay on disk.
pub fn extract_with(
    archive: &Path,
    output: &Path,
    opts: &ExtractOptions,
    cipher: &Cipher,
) -> TcfResult<ExtractReport> {
    let (mut r, header) = open_archive(archive)?;
    check_payload_present(&header, r.get_ref().metadata()?.len())?;
    let payload = read_payload(&mut r, &header)?;
    ensure_directories(output)?;

    let mut report = ExtractReport::default();
    let mut buf = vec![0u8; BUFFER_SIZE];

    for _ in 0..header.entry_count {
        let e = read_record(&mut r)?;

        if !is_safe_entry_path(&e.path) {
            if opts.strict {
                return Err(TcfError::UnsafePath(e.path));
            }
            warn!(path = %e.path, "skipping unsafe entry path");
            report.skipped_unsafe.push(e.path);
            continue;
        }

        if !matches_filter(&e.path, &opts.filter) {
            report.filtered += 1;
            continue;
        }

        check_bounds(&e, payload.len())?;
        let start = e.offset as usize;
        let stored = &payload[start..start + e.size as usize];

        let dest = entry_destination(output, &e.path);
        write_decoded(&dest, stored, &mut buf, cipher).map_err(|source| TcfError::Aborted {
            path: e.path.clone(),
            written: report.extracted.len(),
            source,
        })?;

        debug!(path = %e.path, size = e.size, "extracted");
        report.bytes_written += e.size as u64;
        report.extracted.push(e.path);
    }

    info!(
        archive = %archive.display(),
        output = %output.display(),
        extracted = report.extracted.len(),
        skipped = report.skipped_unsafe.len(),
        filtered = report.filtered,
        "extracted"
    );
    Ok(report)
}

fn write_decoded(
    dest: &Path,
    stored: &[u8],
    buf: &mut [u8],
    cipher: &Cipher,
) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(dest)?);
    for chunk in stored.chunks(buf.len()) {
        let plain = &mut buf[..chunk.len()];
        cipher.decode_into(chunk, plain);
        out.write_all(plain)?;
    }
    out.flush()
}

/// Read archive index entries (without loading payloads).
pub fn entries(archive: &Path) -> TcfResult<Vec<EntryInfo>> {
    let (_, catalog) = read_catalog(archive)?;
    Ok(catalog.into_entries().into_iter().map(|e| e.into_info()).collect())
}

/// Leading bytes of one entry, as stored and decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewedEntry {
    pub path: String,
    pub size: u32,
    pub stored: Vec<u8>,
    pub plain: Vec<u8>,
}

/// Peek at the first `max_bytes` bytes of entry number `index`.
pub fn view(archive: &Path, index: usize, max_bytes: usize) -> TcfResult<ViewedEntry> {
    let (header, catalog) = read_catalog(archive)?;
    let e = catalog.entries().get(index).ok_or_else(|| {
        TcfError::Format(format!(
            "entry index {index} out of range ({} entries)",
            catalog.len()
        ))
    })?;
    check_bounds(e, header.payload_len())?;

    let n = max_bytes.min(e.size as usize);
    let mut f = File::open(archive)?;
    f.seek(SeekFrom::Start(HEADER_LEN as u64 + e.offset as u64))?;
    let mut stored = vec![0u8; n];
    f.read_exact(&mut stored)?;

    let mut plain = vec![0u8; n];
    Cipher::TCF.decode_into(&stored, &mut plain);

    Ok(ViewedEntry {
        path: e.path.clone(),
        size: e.size,
        stored,
        plain,
    })
}

/// Result of a structural check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub entries: u32,
    pub payload_bytes: u64,
    pub footer_present: bool,
}

/// Checks header CRC, index decoding, entry bounds and the footer marker.
///
/// Payload bytes are not covered by any checksum, so they are not inspected.
pub fn verify(archive: &Path) -> TcfResult<VerifyReport> {
    let (mut r, header) = open_archive(archive)?;
    let file_len = r.get_ref().metadata()?.len();
    if header.index_offset as u64 > file_len {
        return Err(TcfError::Format(format!(
            "index offset {} past end of file ({file_len} bytes)",
            header.index_offset
        )));
    }

    r.seek(SeekFrom::Start(header.index_offset as u64))?;
    let catalog = read_index(&mut r, &header)?;
    for e in catalog.entries() {
        check_bounds(e, header.payload_len())?;
    }

    let mut tail = Vec::with_capacity(FOOTER_MAGIC.len());
    r.take(FOOTER_MAGIC.len() as u64).read_to_end(&mut tail)?;
    let footer_present = tail == FOOTER_MAGIC;
    if !footer_present {
        warn!(archive = %archive.display(), "footer marker missing");
    }

    Ok(VerifyReport {
        entries: header.entry_count,
        payload_bytes: header.payload_len() as u64,
        footer_present,
    })
}
