use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// A fixed-length, randomly addressable byte buffer.
///
/// The masking pipeline only ever reads and overwrites bytes at absolute
/// offsets; it never grows or shrinks the buffer. Anything that can hand out
/// a byte slice (an in-memory file, a file read into a `Vec`, a mapped region)
/// can be masked by implementing this trait.
pub trait ByteBuffer {
    fn as_bytes(&self) -> &[u8];
    fn as_bytes_mut(&mut self) -> &mut [u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Overwrite `bytes.len()` bytes starting at `offset`.
    /// Returns `false` (writing nothing) if the range does not fit.
    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> bool {
        match range_mut(self.as_bytes_mut(), offset, bytes.len()) {
            Some(dst) => {
                dst.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }
}

impl ByteBuffer for [u8] {
    fn as_bytes(&self) -> &[u8] {
        self
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl ByteBuffer for Vec<u8> {
    fn as_bytes(&self) -> &[u8] {
        self
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

/// Bounds-checked view of `len` bytes at `offset`.
pub fn range(buf: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    let end = offset.checked_add(len)?;
    buf.get(offset..end)
}

fn range_mut(buf: &mut [u8], offset: usize, len: usize) -> Option<&mut [u8]> {
    let end = offset.checked_add(len)?;
    buf.get_mut(offset..end)
}

/// Big-endian u16, the JPEG marker convention.
pub fn read_u16_be(buf: &[u8], offset: usize) -> Option<u16> {
    range(buf, offset, 2).map(BigEndian::read_u16)
}

/// Byte order of a TIFF block, resolved from its `MM`/`II` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn read_u16(self, buf: &[u8], offset: usize) -> Option<u16> {
        let b = range(buf, offset, 2)?;
        Some(match self {
            Endian::Big => BigEndian::read_u16(b),
            Endian::Little => LittleEndian::read_u16(b),
        })
    }

    pub fn read_u32(self, buf: &[u8], offset: usize) -> Option<u32> {
        let b = range(buf, offset, 4)?;
        Some(match self {
            Endian::Big => BigEndian::read_u32(b),
            Endian::Little => LittleEndian::read_u32(b),
        })
    }

    pub fn u32_bytes(self, val: u32) -> [u8; 4] {
        let mut out = [0u8; 4];
        match self {
            Endian::Big => BigEndian::write_u32(&mut out, val),
            Endian::Little => LittleEndian::write_u32(&mut out, val),
        }
        out
    }

    pub fn i32_bytes(self, val: i32) -> [u8; 4] {
        let mut out = [0u8; 4];
        match self {
            Endian::Big => BigEndian::write_i32(&mut out, val),
            Endian::Little => LittleEndian::write_i32(&mut out, val),
        }
        out
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endian::Big => write!(f, "big-endian (MM)"),
            Endian::Little => write!(f, "little-endian (II)"),
        }
    }
}
