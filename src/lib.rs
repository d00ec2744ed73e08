#![forbid(unsafe_code)]

//! Tbag Content File (TCF v1): bundle a directory tree into one file and back.
//!
//! The payload is obfuscated with a fixed bit rotation, not encrypted, and
//! only the 18-byte header is covered by a CRC.

pub mod tcf;

pub use tcf::{
    ensure_directories, extract, extract_with, pack, pack_with, StatusCode, TcfError, TcfResult,
};
