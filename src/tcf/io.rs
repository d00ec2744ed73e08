#![forbid(unsafe_code)]

use std::io::{ErrorKind, Read, Write};

use crate::tcf::error::{TcfError, TcfResult};

pub fn write_u16(w: &mut dyn Write, v: u16) -> TcfResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn write_u32(w: &mut dyn Write, v: u32) -> TcfResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn read_exact<const N: usize>(r: &mut dyn Read) -> TcfResult<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u16(r: &mut dyn Read) -> TcfResult<u16> {
    Ok(u16::from_le_bytes(read_exact::<2>(r)?))
}

pub fn read_u32(r: &mut dyn Read) -> TcfResult<u32> {
    Ok(u32::from_le_bytes(read_exact::<4>(r)?))
}

/// Turns an unexpected EOF into a format error naming the truncated section.
pub fn truncated<T>(res: TcfResult<T>, section: &str) -> TcfResult<T> {
    res.map_err(|e| match e {
        TcfError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
            TcfError::Format(format!("truncated {section}"))
        }
        other => other,
    })
}

pub fn hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes.iter().copied() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
    out
}
