//! XDR primitives used by the classic header: big-endian integers and
//! byte strings padded to a 4-byte boundary.

use std::io::{self, Read, Result};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

#[inline]
pub(crate) fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

pub(crate) struct XdrReader<R: Read> {
    inner: R,
}

impl<R: Read> XdrReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<BigEndian>()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.inner.read_u64::<BigEndian>()
    }

    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads `len` bytes followed by their padding.
    ///
    /// The buffer grows with the data actually present, so a corrupt length
    /// fails with `UnexpectedEof` instead of a huge allocation.
    pub fn read_opaque(&mut self, len: usize) -> Result<Vec<u8>> {
        let total = len + padding(len);
        let mut buf = Vec::new();
        (&mut self.inner).take(total as u64).read_to_end(&mut buf)?;
        if buf.len() != total {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected end of header",
            ));
        }
        buf.truncate(len);
        Ok(buf)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let buf = self.read_opaque(len)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

pub(crate) struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn write_u32(&mut self, value: u32) {
        // Writing into a Vec cannot fail.
        let _ = self.buf.write_u32::<BigEndian>(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        let _ = self.buf.write_u64::<BigEndian>(value);
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_opaque(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + padding(bytes.len()), 0);
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_opaque(value.as_bytes());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
