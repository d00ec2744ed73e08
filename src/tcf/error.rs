#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TcfError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid tcf: {0}")]
    Format(String),

    #[error("header crc mismatch (stored {stored:#010x}, computed {computed:#010x})")]
    Integrity { stored: u32, computed: u32 },

    #[error("cannot allocate {0} bytes for payload")]
    Memory(usize),

    #[error("too many entries for format: {0}")]
    TooManyEntries(usize),

    #[error("too large for format: {0}")]
    TooLarge(String),

    #[error("path is outside input dir: {0}")]
    Outside(String),

    #[error("unsafe entry path: {0}")]
    UnsafePath(String),

    #[error("extraction aborted at {path} after {written} files: {source}")]
    Aborted {
        path: String,
        written: usize,
        #[source]
        source: std::io::Error,
    },
}

pub type TcfResult<T> = Result<T, TcfError>;

/// Coarse outcome of a pack/extract call, one per error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    IoError,
    FormatError,
    IntegrityError,
    MemoryError,
}

impl StatusCode {
    pub fn of<T>(res: &TcfResult<T>) -> Self {
        match res {
            Ok(_) => StatusCode::Ok,
            Err(e) => StatusCode::from(e),
        }
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }

    /// Line printed by the command line front-end.
    pub fn message(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::IoError => "IO error",
            StatusCode::FormatError => "The TCF file has a format error. Is it a TCF file?",
            StatusCode::IntegrityError => "The TCF file has a CRC error",
            StatusCode::MemoryError => "A memory error occurred!",
        }
    }

    pub fn exit_code(self) -> i32 {
        if self.is_ok() {
            0
        } else {
            1
        }
    }
}

impl From<&TcfError> for StatusCode {
    fn from(e: &TcfError) -> Self {
        match e {
            TcfError::Io(_) | TcfError::Aborted { .. } => StatusCode::IoError,
            TcfError::Format(_)
            | TcfError::TooManyEntries(_)
            | TcfError::TooLarge(_)
            | TcfError::Outside(_)
            | TcfError::UnsafePath(_) => StatusCode::FormatError,
            TcfError::Integrity { .. } => StatusCode::IntegrityError,
            TcfError::Memory(_) => StatusCode::MemoryError,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
