use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    byte_buffer::{
        ExtentBytes,
        WriteBuffer,
    },
    error::{
        ExtentCacheError,
        Result,
    },
};

/// A contiguous run of bytes tagged with the `ExtentMap::current_version` in
/// effect when it was produced — either by the `write` that created it, or
/// by a split of an older extent, in which case the original extent's
/// version is carried forward unchanged (never re-stamped).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extent {
    pub version: u64,
    pub bytes: ExtentBytes,
}

/// Per-object map of non-overlapping, versioned byte extents.
///
/// All mutation happens through `write`/`remove`/`clear`; `entries` is kept
/// sorted by starting offset with no two entries overlapping (I1) and no
/// empty entries (I2). `current_version` only increases (I3/I4) and is never
/// reset by `clear` (see that method's doc comment).
#[derive(Debug, Default)]
pub struct ExtentMap {
    entries: BTreeMap<u64, Extent>,
    current_version: u64,
}

impl ExtentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_version(&self) -> u64 {
        self.current_version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending offset order. Exposed for callers that want to
    /// snapshot or diff the map's contents; not used by `write`/`remove`/
    /// `read` themselves, which operate on `entries` directly.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Extent)> + '_ {
        self.entries.iter().map(|(&o, e)| (o, e))
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &BTreeMap<u64, Extent> {
        &self.entries
    }

    /// First entry whose byte range includes `offset`, or failing that, the
    /// first entry starting at or after `offset`. Lets `write` see an
    /// existing extent that straddles the new write's left edge, which a
    /// plain `entries.range(offset..)` would miss.
    fn extent_lower_bound(&self, offset: u64) -> Option<u64> {
        let at_or_after = self.entries.range(offset..).next().map(|(&k, _)| k);
        if at_or_after == Some(offset) {
            return at_or_after;
        }
        if let Some((&prev_offset, prev_extent)) = self.entries.range(..offset).next_back() {
            if prev_offset + prev_extent.bytes.len() > offset {
                return Some(prev_offset);
            }
        }
        at_or_after
    }

    /// Writes `bytes` at `offset`, splitting or erasing any existing extents
    /// that intersect `[offset, offset + len(bytes))`, and returns the newly
    /// issued version. Fails validation (and leaves the map unchanged) if
    /// `bytes` is empty.
    pub fn write(&mut self, offset: u64, bytes: ExtentBytes) -> Result<u64> {
        if bytes.is_empty() {
            return Err(ExtentCacheError::EmptyWrite { offset });
        }
        let length = bytes.len();
        let w_end = offset
            .checked_add(length)
            .ok_or(ExtentCacheError::RangeOverflow { offset, length })?;

        let mut to_remove = Vec::new();
        let mut to_insert = Vec::new();

        if let Some(start_key) = self.extent_lower_bound(offset) {
            for (&o, e) in self.entries.range(start_key..) {
                if o >= w_end {
                    break;
                }
                let e_end = o + e.bytes.len();
                if e_end <= offset {
                    // Adjacent on the left, not intersecting.
                    continue;
                }

                to_remove.push(o);

                if o < offset {
                    // Left-overhang (or straddle): residual bytes before
                    // the write keep the original version.
                    to_insert.push((
                        o,
                        Extent {
                            version: e.version,
                            bytes: e.bytes.slice(0, offset - o),
                        },
                    ));
                }
                if e_end > w_end {
                    // Right-overhang (or straddle): residual bytes after
                    // the write keep the original version.
                    to_insert.push((
                        w_end,
                        Extent {
                            version: e.version,
                            bytes: e.bytes.slice(w_end - o, e_end - o),
                        },
                    ));
                }
            }
        }

        for o in to_remove {
            self.entries.remove(&o);
        }
        for (o, e) in to_insert {
            self.entries.insert(o, e);
        }

        self.current_version += 1;
        let version = self.current_version;
        trace!(offset, length, version, "write");
        self.entries.insert(offset, Extent { version, bytes });
        Ok(version)
    }

    /// Erases entries whose starting offset lies in `[offset, offset +
    /// length)` and whose version exactly equals `version`. Entries in that
    /// range with a newer version are left in place (they supersede the
    /// data being retired); entries with an older version indicate the
    /// caller is retiring a version token out of order, which is a fatal
    /// protocol violation and panics rather than returning an error.
    pub fn remove(&mut self, offset: u64, length: u64, version: u64) -> Result<()> {
        let r_end = offset
            .checked_add(length)
            .ok_or(ExtentCacheError::RangeOverflow { offset, length })?;
        if version > self.current_version {
            return Err(ExtentCacheError::FutureVersion {
                version,
                current_version: self.current_version,
            });
        }

        let mut to_remove = Vec::new();
        for (&o, e) in self.entries.range(offset..r_end) {
            if e.version == version {
                to_remove.push(o);
            } else {
                assert!(
                    e.version > version,
                    "extent at offset {o} has version {} < remove version {version}; caller \
                     retired a version token out of order",
                    e.version
                );
            }
        }
        trace!(offset, length, version, removed = to_remove.len(), "remove");
        for o in to_remove {
            self.entries.remove(&o);
        }
        Ok(())
    }

    /// Copies every cached byte intersecting `[offset, offset + length)`
    /// into `out`. Bytes of `out` in gaps not covered by any extent are left
    /// untouched, so the caller can pre-seed `out` with a lower-layer read
    /// and have this overlay cached writes on top of it.
    pub fn read(&self, offset: u64, length: u64, out: &mut impl WriteBuffer) -> Result<()> {
        if out.len() < length {
            return Err(ExtentCacheError::BufferTooSmall {
                out_len: out.len(),
                length,
            });
        }
        let r_end = offset
            .checked_add(length)
            .ok_or(ExtentCacheError::RangeOverflow { offset, length })?;

        let Some(start_key) = self.extent_lower_bound(offset) else {
            trace!(offset, length, "read (no cached data)");
            return Ok(());
        };
        for (&o, e) in self.entries.range(start_key..) {
            if o >= r_end {
                break;
            }
            let e_end = o + e.bytes.len();
            let overlap_start = o.max(offset);
            let overlap_end = e_end.min(r_end);
            if overlap_start >= overlap_end {
                continue;
            }
            let copy_len = overlap_end - overlap_start;
            let src_start = overlap_start - o;
            let dst_start = overlap_start - offset;
            let src = &e.bytes.raw()[src_start as usize..(src_start + copy_len) as usize];
            out.copy_into(dst_start, copy_len, src);
        }
        trace!(offset, length, "read");
        Ok(())
    }

    /// Drops all entries. Deliberately does not reset `current_version`: a
    /// version token a caller is still holding after a `clear` must never
    /// collide with one issued afterwards.
    pub fn clear(&mut self) {
        trace!(entries = self.entries.len(), "clear");
        self.entries.clear();
    }
}
