use std::ops::Deref;

use bytes::Bytes;

/// The owned byte payload carried by an [`crate::extent_map::Extent`].
///
/// Backed by [`bytes::Bytes`], so `slice` is an `O(1)` reference-count bump
/// into the same backing allocation rather than a copy — splitting an extent
/// on overlap (spec straddling/overhang cases) never touches the bytes
/// themselves, only the offsets that bound each fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtentBytes(Bytes);

impl ExtentBytes {
    pub fn len(&self) -> u64 {
        self.0.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Owned slice over `[start, end)` of this buffer. Panics if the range is
    /// out of bounds, matching `Bytes::slice`.
    pub fn slice(&self, start: u64, end: u64) -> Self {
        Self(self.0.slice(start as usize..end as usize))
    }

    pub fn raw(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for ExtentBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for ExtentBytes {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for ExtentBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for ExtentBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for ExtentBytes {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

/// A caller-owned, mutable output buffer for `read`. Gaps between extents are
/// left untouched, so the caller's pre-existing contents act as an underlay
/// that the cache overlays cached bytes on top of.
pub trait WriteBuffer {
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `length` bytes from `src` into `self` starting at `dst_offset`.
    fn copy_into(&mut self, dst_offset: u64, length: u64, src: &[u8]);
}

impl WriteBuffer for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn copy_into(&mut self, dst_offset: u64, length: u64, src: &[u8]) {
        let dst_offset = dst_offset as usize;
        let length = length as usize;
        self[dst_offset..dst_offset + length].copy_from_slice(&src[..length]);
    }
}

impl WriteBuffer for Vec<u8> {
    fn len(&self) -> u64 {
        Vec::len(self) as u64
    }

    fn copy_into(&mut self, dst_offset: u64, length: u64, src: &[u8]) {
        self.as_mut_slice().copy_into(dst_offset, length, src)
    }
}
