/// An opaque, totally ordered identifier for the object an extent map
/// belongs to. The enclosing storage engine's real hashed object identifier
/// is out of scope for this crate; this newtype is the concrete stand-in
/// used by [`crate::cache::Cache`] and its tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
