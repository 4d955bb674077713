//! Kbuckets
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::RangeInclusive,
    time::Instant,
};

use lru::LruCache;
use primitive_types::U256;
use tracing::{debug, trace};

use crate::common::{bytes_to_bit_string, shared_prefix, Id, IdDigest, Node, Sha1Digest};
use crate::{Error, Result};

/// K = the default maximum size of a k-bucket.
pub const DEFAULT_K: usize = 20;
/// Default multiple of K kept as replacement candidates.
pub const DEFAULT_REPLACEMENT_FACTOR: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
/// KBucket configurations
pub struct KBucketConfig {
    /// K (as in k-bucket) is the maximum number of live nodes in a k-bucket.
    ///
    /// Defaults to [DEFAULT_K]
    pub k: usize,
    /// The replacement cache of a bucket holds at most `k * replacement_factor`
    /// nodes that arrived while the bucket was full.
    ///
    /// Defaults to [DEFAULT_REPLACEMENT_FACTOR]
    pub replacement_factor: usize,
}

impl KBucketConfig {
    // === Options ===

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_replacement_factor(mut self, replacement_factor: usize) -> Self {
        self.replacement_factor = replacement_factor;
        self
    }
}

impl Default for KBucketConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            replacement_factor: DEFAULT_REPLACEMENT_FACTOR,
        }
    }
}

/// Kbuckets are similar to LRU caches that keep the least recently seen nodes,
/// staging newcomers in a bounded replacement cache until a slot frees up.
///
/// Each bucket is responsible for a closed range of the numeric id space, and
/// can be split in two halves by its owner once that range gets crowded.
///
/// A bucket does no locking of its own, owners must serialize mutations.
pub struct KBucket {
    /// The closed range of numeric ids this bucket is responsible for.
    range: RangeInclusive<U256>,
    config: KBucketConfig,
    /// Live nodes, from most recently seen to least recently seen.
    nodes: LruCache<Id, Node>,
    /// Candidates to replace live nodes, same ordering as `nodes`.
    replacement_nodes: LruCache<Id, Node>,
    /// Keep track of the last time this bucket was touched.
    last_updated: Instant,
}

impl KBucket {
    /// Create an empty bucket responsible for `lower..=upper`.
    pub fn new(lower: U256, upper: U256, config: KBucketConfig) -> Self {
        KBucket {
            range: lower..=upper,
            config,
            nodes: LruCache::unbounded(),
            replacement_nodes: LruCache::unbounded(),
            last_updated: Instant::now(),
        }
    }

    // === Getters ===

    pub fn range(&self) -> &RangeInclusive<U256> {
        &self.range
    }

    pub fn config(&self) -> &KBucketConfig {
        &self.config
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Maximum number of nodes in the replacement cache.
    pub fn max_replacement_nodes(&self) -> usize {
        self.config.k.saturating_mul(self.config.replacement_factor)
    }

    pub fn last_updated(&self) -> Instant {
        self.last_updated
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.config.k
    }

    /// Returns the live node with this id, without affecting its recency.
    pub fn get(&self, id: &Id) -> Option<&Node> {
        self.nodes.peek(id)
    }

    /// Iterate over live nodes, least recently seen first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().rev().map(|(_, node)| node)
    }

    /// Owned list of live nodes, least recently seen first.
    pub fn nodes(&self) -> Vec<Node> {
        self.iter().cloned().collect()
    }

    /// Owned list of replacement candidates, oldest first.
    pub fn replacement_nodes(&self) -> Vec<Node> {
        self.replacement_nodes
            .iter()
            .rev()
            .map(|(_, node)| node.clone())
            .collect()
    }

    /// Returns true if the node's numeric id falls within this bucket's range.
    pub fn has_in_range(&self, node: &Node) -> bool {
        self.range.contains(node.numeric_id())
    }

    /// Returns true if the node is not one of the live nodes.
    pub fn is_new(&self, node: &Node) -> bool {
        !self.nodes.contains(node.id())
    }

    /// Returns true if the range holds more than one id.
    ///
    /// Splitting a bucket that isn't splittable yields an empty second range,
    /// `lower + 1..=lower`, or `MAX..=MAX - 1` when `lower` is [U256::MAX].
    pub fn is_splittable(&self) -> bool {
        self.range.start() < self.range.end()
    }

    /// The least recently seen live node.
    pub fn head(&self) -> Result<&Node> {
        self.nodes
            .peek_lru()
            .map(|(_, node)| node)
            .ok_or(Error::EmptyBucket)
    }

    /// Length in bits of the prefix shared by all live node ids, 0 if empty.
    pub fn depth(&self) -> usize {
        let bit_strings: Vec<String> = self
            .iter()
            .map(|node| bytes_to_bit_string(node.id().as_bytes()))
            .collect();
        let sequences: Vec<&[u8]> = bit_strings.iter().map(|s| s.as_bytes()).collect();

        shared_prefix(&sequences).len()
    }

    // === Public Methods ===

    pub fn touch(&mut self) {
        self.last_updated = Instant::now();
    }

    /// Add a node to this bucket, returns `true` if it is (or stays) a live node.
    ///
    /// A known live node is moved to the most recently seen position, even if
    /// its address changed. If the bucket is full, the node is kept as a
    /// replacement candidate instead, and `false` is returned.
    ///
    /// The range is not checked here; callers dispatch by [Self::has_in_range].
    pub fn add_node(&mut self, node: Node) -> bool {
        let id = *node.id();

        if self.nodes.contains(&id) {
            self.nodes.pop(&id);
            self.nodes.push(id, node);

            trace!(?id, "Refreshed live node");
            true
        } else if self.nodes.len() < self.config.k {
            self.replacement_nodes.pop(&id);
            self.nodes.push(id, node);

            trace!(?id, live = self.nodes.len(), "Added live node");
            true
        } else {
            self.replacement_nodes.pop(&id);
            self.replacement_nodes.push(id, node);

            while self.replacement_nodes.len() > self.max_replacement_nodes() {
                match self.replacement_nodes.pop_lru() {
                    Some((evicted, _)) => debug!(?evicted, "Evicted oldest replacement node"),
                    None => break,
                }
            }

            trace!(
                ?id,
                replacements = self.replacement_nodes.len(),
                "Bucket full, staged replacement node"
            );
            false
        }
    }

    /// Remove a node from this bucket, doing nothing if it is unknown.
    ///
    /// Removing a live node promotes the most recently added replacement
    /// candidate, if any.
    pub fn remove_node(&mut self, id: &Id) {
        self.replacement_nodes.pop(id);

        if self.nodes.pop(id).is_none() {
            return;
        }

        let newest = self.replacement_nodes.iter().next().map(|(newest, _)| *newest);

        if let Some(promoted) = newest {
            if let Some(node) = self.replacement_nodes.pop(&promoted) {
                debug!(removed = ?id, ?promoted, "Promoted replacement node");
                self.nodes.push(promoted, node);
            }
        }
    }

    /// Split this bucket at the middle of its range, redistributing live nodes
    /// then replacement candidates into the child whose range contains them.
    ///
    /// The first child covers `lower..=midpoint` and the second
    /// `midpoint + 1..=upper`, where `midpoint = (lower + upper) / 2`.
    pub fn split(self) -> (KBucket, KBucket) {
        let lower = *self.range.start();
        let upper = *self.range.end();
        let midpoint = midpoint(lower, upper);

        let mut one = KBucket::new(lower, midpoint, self.config);
        let mut two = match midpoint.checked_add(U256::one()) {
            Some(next) => KBucket::new(next, upper, self.config),
            None => KBucket::new(U256::MAX, U256::MAX - 1, self.config),
        };

        let nodes = self
            .nodes
            .iter()
            .rev()
            .chain(self.replacement_nodes.iter().rev())
            .map(|(_, node)| node);

        for node in nodes {
            let bucket = if node.numeric_id() <= &midpoint {
                &mut one
            } else {
                &mut two
            };

            bucket.add_node(node.clone());
        }

        debug!(
            ?lower,
            ?midpoint,
            ?upper,
            one = one.len(),
            two = two.len(),
            "Split bucket"
        );

        (one, two)
    }

    /// Insert a node known only by raw bytes, deriving its id with SHA-1.
    ///
    /// See [Self::insert_by_identifier_with].
    pub fn insert_by_identifier(&mut self, raw: &[u8]) -> bool {
        self.insert_by_identifier_with(raw, &Sha1Digest)
    }

    /// Insert an address-less node whose id is the `digest` of `raw`.
    ///
    /// Returns `false` if the id is out of range. Unlike [Self::add_node], an
    /// id that is already live is replaced in place, keeping its position.
    pub fn insert_by_identifier_with<D: IdDigest + ?Sized>(
        &mut self,
        raw: &[u8],
        digest: &D,
    ) -> bool {
        let node = Node::hashed(raw, digest);

        if !self.has_in_range(&node) {
            return false;
        }

        if self.is_new(&node) {
            return self.add_node(node);
        }

        let id = *node.id();
        if let Some(existing) = self.nodes.peek_mut(&id) {
            *existing = node;
        }

        true
    }
}

/// `(lower + upper) / 2` without overflowing.
fn midpoint(lower: U256, upper: U256) -> U256 {
    (lower >> 1) + (upper >> 1) + (lower & upper & U256::one())
}

impl Debug for KBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KBucket{{ range: {}..={}, nodes: {}, replacements: {} }}",
            self.range.start(),
            self.range.end(),
            self.nodes.len(),
            self.replacement_nodes.len()
        )
    }
}

impl Display for KBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "KBucket {}..={} ({}/{})",
            self.range.start(),
            self.range.end(),
            self.nodes.len(),
            self.config.k
        )?;

        if self.nodes.is_empty() {
            return writeln!(f, "No nodes in the bucket.");
        }

        for node in self.iter() {
            writeln!(f, "{} {} {}", node.id(), node.numeric_id(), node)?;
        }

        Ok(())
    }
}
