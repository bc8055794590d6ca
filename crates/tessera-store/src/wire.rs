//! Primitive encoding helpers for column files.
//!
//! Everything is big-endian. Strings are a `u32` byte length followed by
//! UTF-8 bytes; there is no other framing, so both sides must agree on the
//! value count from the table metadata.

use std::io::{self, Read, Write};

macro_rules! rw_number {
    ($write:ident, $read:ident, $ty:ty) => {
        pub fn $write<W: Write>(out: &mut W, value: $ty) -> io::Result<()> {
            out.write_all(&value.to_be_bytes())
        }

        pub fn $read<R: Read>(input: &mut R) -> io::Result<$ty> {
            let mut buf = [0u8; std::mem::size_of::<$ty>()];
            input.read_exact(&mut buf)?;
            Ok(<$ty>::from_be_bytes(buf))
        }
    };
}

rw_number!(write_u8, read_u8, u8);
rw_number!(write_u16, read_u16, u16);
rw_number!(write_u32, read_u32, u32);
rw_number!(write_u64, read_u64, u64);
rw_number!(write_i8, read_i8, i8);
rw_number!(write_i16, read_i16, i16);
rw_number!(write_i32, read_i32, i32);
rw_number!(write_i64, read_i64, i64);
rw_number!(write_f32, read_f32, f32);
rw_number!(write_f64, read_f64, f64);

pub fn write_str<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string exceeds u32 length"))?;
    write_u32(out, len)?;
    out.write_all(value.as_bytes())
}

pub fn read_str<R: Read>(input: &mut R) -> io::Result<String> {
    let len = read_u32(input)? as usize;
    // The prefix is untrusted; read through `take` so a corrupt length fails
    // on EOF instead of sizing an allocation.
    let mut buf = Vec::with_capacity(len.min(1 << 16));
    input.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "string shorter than its length prefix",
        ));
    }
    String::from_utf8(buf)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid UTF-8: {e}")))
}
