//! An in-memory, per-object versioned extent cache.
//!
//! Stages client writes that have been acknowledged but not yet durably
//! applied to their final location: a write is recorded here and is
//! immediately visible to subsequent reads on the same object, until the
//! enclosing storage engine retires it by passing back the version token
//! this crate issued.
//!
//! [`Cache`] is a thin per-object dispatch layer; [`ExtentMap`] carries all
//! of the overlap/split/version bookkeeping for a single object.

mod byte_buffer;
mod cache;
mod error;
mod extent_map;
mod object_id;

pub use byte_buffer::{
    ExtentBytes,
    WriteBuffer,
};
pub use cache::Cache;
pub use error::{
    ExtentCacheError,
    Result,
};
pub use extent_map::{
    Extent,
    ExtentMap,
};
pub use object_id::ObjectId;
