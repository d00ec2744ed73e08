#![forbid(unsafe_code)]

mod build;
mod catalog;
mod cipher;
mod crc;
mod error;
mod format;
mod io;
mod ops;
mod path;
mod read;
mod walk;

pub use build::{pack_with, PackOptions, PackSummary};
pub use cipher::{Cipher, SHIFT_BITS};
pub use crc::crc32;
pub use error::{StatusCode, TcfError, TcfResult};
pub use format::{EntryInfo, Header, BUFFER_SIZE, FOOTER_MAGIC, HEADER_LEN, MAGIC, VERSION};
pub use io::hex;
pub use path::{ensure_directories, ensure_parent_directories, is_safe_entry_path};
pub use walk::{walk, WalkedFile};

pub use ops::{
    entries, extract, extract_with, pack, verify, view, ExtractOptions, ExtractReport,
    VerifyReport, ViewedEntry,
};
