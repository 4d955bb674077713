#![doc = include_str!("../README.md")]
//! ## Feature flags
#![doc = document_features::document_features!()]
//!

mod common;
mod error;
mod kbucket;

pub use crate::common::{
    bytes_to_bit_string, derive_numeric_id, shared_prefix, Id, IdDigest, Node, Sha1Digest,
    ID_BITS, ID_SIZE,
};
pub use crate::error::{Error, Result};
pub use crate::kbucket::{KBucket, KBucketConfig, DEFAULT_K, DEFAULT_REPLACEMENT_FACTOR};

pub use primitive_types::U256;
