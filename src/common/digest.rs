//! Deriving node Ids from arbitrary bytes.

use primitive_types::U256;
use sha1_smol::Sha1;

use super::Id;

/// A one-way, 160 bits digest used to turn arbitrary bytes into an [Id].
///
/// Implemented for any `Fn(&[u8]) -> Id`, so tests can plug in a
/// predictable mapping.
pub trait IdDigest {
    fn digest(&self, raw: &[u8]) -> Id;
}

#[derive(Debug, Clone, Copy, Default)]
/// SHA-1, the default [IdDigest].
pub struct Sha1Digest;

impl IdDigest for Sha1Digest {
    fn digest(&self, raw: &[u8]) -> Id {
        let mut hasher = Sha1::new();
        hasher.update(raw);

        hasher.digest().bytes().into()
    }
}

impl<F> IdDigest for F
where
    F: Fn(&[u8]) -> Id,
{
    fn digest(&self, raw: &[u8]) -> Id {
        self(raw)
    }
}

/// SHA-1 of `raw` interpreted as a big-endian unsigned integer.
pub fn derive_numeric_id(raw: &[u8]) -> U256 {
    Sha1Digest.digest(raw).to_numeric()
}
