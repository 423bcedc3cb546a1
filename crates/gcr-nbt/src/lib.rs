//! NBT (Named Binary Tag) for Java edition block entity persistence.
//!
//! Java edition NBT is big-endian throughout: ints are `i32_be`, string
//! lengths are `u16_be`, array and list lengths are `i32_be`. Level files wrap
//! the binary form in gzip, see [`read_gzip`] / [`write_gzip`].

pub mod error;
mod io;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag};

use std::io::{Read, Write};

use bytes::{Buf, BufMut};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Read one root compound from a buffer.
pub fn read_nbt(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    io::read_root(buf)
}

/// Write one root compound to a buffer.
pub fn write_nbt(buf: &mut impl BufMut, root: &NbtRoot) -> Result<(), NbtError> {
    io::write_root(buf, root)
}

/// Decode gzip-compressed NBT (the on-disk form of level data).
pub fn read_gzip(data: &[u8]) -> Result<NbtRoot, NbtError> {
    let mut raw = Vec::new();
    GzDecoder::new(data).read_to_end(&mut raw)?;
    read_nbt(&mut raw.as_slice())
}

/// Encode a root compound and gzip it.
pub fn write_gzip(root: &NbtRoot) -> Result<Vec<u8>, NbtError> {
    let mut raw = Vec::new();
    write_nbt(&mut raw, root)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}
