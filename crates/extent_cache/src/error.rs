use thiserror::Error;

/// Caller-value errors reported from the public `ExtentMap`/`Cache` API.
///
/// Invariant violations (a caller passing a `remove` version that was never
/// issued for the range in question) are not represented here: they are
/// fail-stop bugs in the caller's own version bookkeeping and panic instead,
/// since there is no meaningful way for the caller to recover from evidence
/// that its own protocol invariant is broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtentCacheError {
    #[error("write with empty bytes at offset {offset}")]
    EmptyWrite { offset: u64 },

    #[error("offset {offset} + length {length} overflows u64")]
    RangeOverflow { offset: u64, length: u64 },

    #[error("remove version {version} is greater than current_version {current_version}")]
    FutureVersion { version: u64, current_version: u64 },

    #[error("read buffer of length {out_len} is smaller than requested length {length}")]
    BufferTooSmall { out_len: u64, length: u64 },
}

pub type Result<T> = std::result::Result<T, ExtentCacheError>;
