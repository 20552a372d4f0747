use std::collections::HashMap;

use tracing::debug;

use crate::{
    byte_buffer::{
        ExtentBytes,
        WriteBuffer,
    },
    error::Result,
    extent_map::ExtentMap,
    object_id::ObjectId,
};

/// Per-node cache of staged writes, keyed by object. Thin dispatch over
/// [`ExtentMap`]: all of the overlap/split/version bookkeeping lives there.
/// `Cache` never deletes a map implicitly (an empty map remains valid), the
/// one exception being the explicit [`Cache::clear`].
#[derive(Debug, Default)]
pub struct Cache {
    objects: HashMap<ObjectId, ExtentMap>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, oid: ObjectId, offset: u64, bytes: ExtentBytes) -> Result<u64> {
        let map = self.objects.entry(oid).or_insert_with(|| {
            debug!(?oid, "creating extent map for previously unseen object");
            ExtentMap::new()
        });
        map.write(offset, bytes)
    }

    pub fn remove(&mut self, oid: ObjectId, offset: u64, length: u64, version: u64) -> Result<()> {
        match self.objects.get_mut(&oid) {
            Some(map) => map.remove(offset, length, version),
            None => Ok(()),
        }
    }

    pub fn read(
        &self,
        oid: ObjectId,
        offset: u64,
        length: u64,
        out: &mut impl WriteBuffer,
    ) -> Result<()> {
        match self.objects.get(&oid) {
            Some(map) => map.read(offset, length, out),
            None => Ok(()),
        }
    }

    /// Drops the whole map for `oid`, reclaiming its memory. Unlike
    /// `ExtentMap::clear`, this *does* reset the object's version counter:
    /// a subsequent `write` re-creates a fresh map starting from version 0,
    /// since no live version token for this object can possibly survive
    /// the map being dropped.
    pub fn clear(&mut self, oid: ObjectId) {
        if self.objects.remove(&oid).is_some() {
            debug!(?oid, "dropped extent map, resetting its version counter");
        }
    }

    #[cfg(test)]
    pub(crate) fn object_count(&self) -> usize {
        self.objects.len()
    }
}
