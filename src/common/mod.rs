//! Miscellaneous common structs used throughout the library.

mod bits;
mod digest;
mod id;
mod node;

pub use bits::*;
pub use digest::*;
pub use id::*;
pub use node::*;
