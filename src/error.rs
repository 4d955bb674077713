//! Main Crate Error

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Kbucket crate error enum.
pub enum Error {
    /// Node identifiers must be exactly [ID_SIZE](crate::ID_SIZE) bytes.
    #[error("Invalid identifier: expected 20 bytes, got {0}")]
    InvalidIdentifier(usize),

    /// Failed to parse a hex encoded [Id](crate::Id).
    #[error("Invalid hex encoded identifier: {0:?}")]
    InvalidIdHex(String),

    /// [KBucket::head](crate::KBucket::head) was called on a bucket without live nodes.
    #[error("KBucket has no live nodes")]
    EmptyBucket,
}

/// Alias for `std::result::Result<T, kbucket::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
