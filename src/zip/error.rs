use thiserror::Error;

/// Reasons an entry list cannot be written as a classic (non-ZIP64) archive.
///
/// Every check runs before any output is produced, so a failed
/// [`encode`](super::encode) never yields a truncated archive.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("entry name is {len} bytes, the limit is 65535: {name}")]
    NameTooLong { name: String, len: usize },

    #[error("entry `{name}` is {len} bytes, stored entries are limited to 4 GiB")]
    EntryTooLarge { name: String, len: u64 },

    #[error("{0} entries exceed the 65535-entry limit of a single-disk archive")]
    TooManyEntries(usize),

    #[error("archive offsets exceed 4 GiB at entry `{name}`")]
    ArchiveTooLarge { name: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type EncodeResult<T> = Result<T, EncodeError>;
