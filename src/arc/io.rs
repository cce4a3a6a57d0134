#![forbid(unsafe_code)]

use std::io::{Read, Write};

use crate::arc::error::ArcResult;

pub fn write_u32(w: &mut dyn Write, v: u32) -> ArcResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn read_exact<const N: usize>(r: &mut dyn Read) -> ArcResult<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u32(r: &mut dyn Read) -> ArcResult<u32> {
    Ok(u32::from_le_bytes(read_exact::<4>(r)?))
}

/// Reads up to `len` bytes. Returns fewer only if the stream ends first.
pub fn read_up_to(r: &mut dyn Read, len: u32) -> ArcResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(1 << 20) as usize);
    r.take(u64::from(len)).read_to_end(&mut buf)?;
    Ok(buf)
}
