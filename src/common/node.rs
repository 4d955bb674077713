//! Struct and implementation of the Node entry in a k-bucket
use std::{
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    net::SocketAddr,
    sync::Arc,
};

use primitive_types::U256;

use crate::common::{Id, IdDigest, ID_SIZE};
use crate::Result;

#[derive(Clone)]
/// Node entry in a k-bucket.
///
/// Nodes are never mutated after construction, so clones are cheap and can
/// be held by more than one collection at a time.
pub struct Node(Arc<NodeInner>);

struct NodeInner {
    id: Id,
    address: Option<SocketAddr>,
    numeric_id: U256,
}

impl Node {
    /// Creates a new Node from a trusted id and an optional socket address.
    pub fn new(id: Id, address: Option<SocketAddr>) -> Node {
        Node(Arc::new(NodeInner {
            numeric_id: id.to_numeric(),
            id,
            address,
        }))
    }

    /// Creates a new Node from raw id bytes, failing with
    /// [Error::InvalidIdentifier](crate::Error::InvalidIdentifier) unless
    /// there are exactly 20 of them.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T, address: Option<SocketAddr>) -> Result<Node> {
        Ok(Node::new(Id::from_bytes(bytes)?, address))
    }

    /// Creates an address-less Node whose id is the `digest` of `raw`.
    pub fn hashed<D: IdDigest + ?Sized>(raw: &[u8], digest: &D) -> Node {
        Node::new(digest.digest(raw), None)
    }

    /// Creates an address-less Node with a random id.
    pub fn random() -> Node {
        Node::new(Id::random(), None)
    }

    /// Creates an address-less Node whose numeric id is `i`.
    pub fn unique(i: u64) -> Node {
        let mut bytes = [0_u8; ID_SIZE];
        bytes[ID_SIZE - 8..].copy_from_slice(&i.to_be_bytes());

        Node::new(Id(bytes), None)
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.0.id
    }

    pub fn address(&self) -> Option<SocketAddr> {
        self.0.address
    }

    /// The id as a big-endian unsigned integer.
    pub fn numeric_id(&self) -> &U256 {
        &self.0.numeric_id
    }

    // === Public Methods ===

    /// XOR distance to another node.
    pub fn distance_to(&self, other: &Node) -> U256 {
        *self.numeric_id() ^ *other.numeric_id()
    }

    /// Returns true if both nodes share the same address, regardless of their ids.
    pub fn same_home_as(&self, other: &Node) -> bool {
        self.0.address == other.0.address
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state)
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.0.id)
            .field("numeric_id", &self.0.numeric_id)
            .field("address", &self.0.address)
            .finish()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.address {
            Some(address) => write!(f, "{}", address),
            None => write!(f, "-"),
        }
    }
}
