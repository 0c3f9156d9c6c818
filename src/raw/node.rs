use smallvec::SmallVec;

use super::handle::Handle;
use crate::comparator::Compare;

#[cfg(test)]
pub(crate) const ORDER: usize = 16;
#[cfg(not(test))]
pub(crate) const ORDER: usize = 64;

pub(crate) const MAX_CHILDREN: usize = ORDER;
pub(crate) const MIN_CHILDREN: usize = ORDER.div_ceil(2);
pub(crate) const MAX_KEYS: usize = MAX_CHILDREN - 1;
pub(crate) const MIN_INTERNAL_KEYS: usize = MIN_CHILDREN - 1;
pub(crate) const MIN_LEAF_KEYS: usize = MAX_KEYS.div_ceil(2);

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

// Separator keys satisfy child[i] <= keys[i] < child[i + 1].
pub(crate) struct InternalNode<K> {
    // Number of keys stored in the subtree.
    size: usize,
    // +1 leaves room for the overflowing key before a split.
    keys: SmallVec<[K; MAX_KEYS + 1]>,
    children: SmallVec<[Handle; MAX_CHILDREN + 1]>,
    child_sizes: SmallVec<[usize; MAX_CHILDREN + 1]>,
}

pub(crate) struct LeafNode<K> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: SmallVec<[K; MAX_KEYS + 1]>,
}

/// Outcome of a binary search inside a leaf.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<K> Node<K> {
    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Number of keys stored in the subtree rooted at this node.
    pub(crate) fn subtree_size(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.size,
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates a new empty internal node.
    pub(crate) fn new() -> Self {
        Self {
            size: 0,
            keys: SmallVec::new(),
            children: SmallVec::new(),
            child_sizes: SmallVec::new(),
        }
    }

    /// Returns the number of separator keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of children in this node.
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns true if this node is below minimum capacity and needs rebalancing.
    pub(crate) fn is_at_minimum(&self) -> bool {
        self.keys.len() < MIN_INTERNAL_KEYS
    }

    /// Returns true if this node can lend a child to a sibling.
    pub(crate) fn can_lend(&self) -> bool {
        self.keys.len() > MIN_INTERNAL_KEYS
    }

    /// Returns the number of keys stored in the subtree.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Recalculates the subtree size from the child sizes.
    pub(crate) fn update_size(&mut self) {
        self.size = self.child_sizes.iter().sum();
    }

    /// Adjusts the size of child `index` and of this subtree by one key.
    pub(crate) fn grow_child(&mut self, index: usize) {
        self.child_sizes[index] += 1;
        self.size += 1;
    }

    /// Returns the separator key at the given index.
    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    /// Returns the child handle at the given index.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    /// Returns the subtree size of the child at the given index.
    #[inline]
    pub(crate) fn child_size(&self, index: usize) -> usize {
        self.child_sizes[index]
    }

    /// Sets the subtree size of the child at the given index.
    pub(crate) fn set_child_size(&mut self, index: usize, size: usize) {
        self.child_sizes[index] = size;
    }

    /// Index of the child whose key range covers `key`.
    #[inline]
    pub(crate) fn search_child<C: Compare<K>>(&self, key: &K, cmp: &C) -> usize {
        match self.keys.binary_search_by(|k| cmp.compare(k, key)) {
            Ok(idx) | Err(idx) => idx,
        }
    }

    /// Locates the child holding the key at `rank` within this subtree.
    /// Returns the child index and the rank relative to that child.
    pub(crate) fn child_for_rank(&self, mut rank: usize) -> Option<(usize, usize)> {
        for (index, &size) in self.child_sizes.iter().enumerate() {
            if rank < size {
                return Some((index, rank));
            }
            rank -= size;
        }
        None
    }

    /// Keys stored in children left of `index`.
    pub(crate) fn size_before(&self, index: usize) -> usize {
        self.child_sizes[..index].iter().sum()
    }

    /// Inserts a separator and its right child at the given position.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle, child_size: usize) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
        self.child_sizes.insert(index + 1, child_size);
    }

    /// Removes a separator and its right child, returning both with the child's size.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle, usize) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        let size = self.child_sizes.remove(index + 1);
        (key, child, size)
    }

    /// Pushes a separator and child to the end.
    pub(crate) fn push_child(&mut self, key: K, child: Handle, child_size: usize) {
        self.keys.push(key);
        self.children.push(child);
        self.child_sizes.push(child_size);
    }

    /// Pushes a separator and child to the front (used when borrowing from the left).
    pub(crate) fn push_child_front(&mut self, key: K, child: Handle, child_size: usize) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
        self.child_sizes.insert(0, child_size);
    }

    /// Sets the first child (before any keys).
    pub(crate) fn set_first_child(&mut self, child: Handle, child_size: usize) {
        if self.children.is_empty() {
            self.children.push(child);
            self.child_sizes.push(child_size);
        } else {
            self.children[0] = child;
            self.child_sizes[0] = child_size;
        }
    }

    /// Updates a separator key at the given index.
    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    /// Pops the last separator and child.
    pub(crate) fn pop_child(&mut self) -> Option<(K, Handle, usize)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        let size = self.child_sizes.pop()?;
        Some((key, child, size))
    }

    /// Pops the first separator and child.
    pub(crate) fn pop_child_front(&mut self) -> Option<(K, Handle, usize)> {
        if self.keys.is_empty() {
            return None;
        }
        let key = self.keys.remove(0);
        let child = self.children.remove(0);
        let size = self.child_sizes.remove(0);
        Some((key, child, size))
    }

    /// Splits off the upper half. Returns the promoted separator and the new
    /// right sibling.
    pub(crate) fn split(&mut self) -> (K, InternalNode<K>) {
        let mid = self.keys.len() / 2;

        let mut right = InternalNode::new();
        right.keys = self.keys.drain(mid + 1..).collect();
        right.children = self.children.drain(mid + 1..).collect();
        right.child_sizes = self.child_sizes.drain(mid + 1..).collect();

        let separator = self.keys.pop().expect("`InternalNode::split()` - node has no keys!");

        self.update_size();
        right.update_size();

        (separator, right)
    }

    /// Absorbs `right`, pulling `separator` down between the two halves.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: InternalNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
        self.child_sizes.append(&mut right.child_sizes);
        self.update_size();
    }
}

impl<K> LeafNode<K> {
    /// Creates a new empty leaf node.
    pub(crate) fn new() -> Self {
        Self {
            prev: None,
            next: None,
            keys: SmallVec::new(),
        }
    }

    /// Returns the number of keys in this leaf.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf is below minimum capacity and needs rebalancing.
    pub(crate) fn is_at_minimum(&self) -> bool {
        self.keys.len() < MIN_LEAF_KEYS
    }

    /// Returns true if this leaf can lend a key to a sibling.
    pub(crate) fn can_lend(&self) -> bool {
        self.keys.len() > MIN_LEAF_KEYS
    }

    /// Returns the previous leaf in key order.
    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    /// Sets the previous leaf link.
    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    /// Returns the next leaf in key order.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    /// Sets the next leaf link.
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    /// Returns all keys.
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the largest key in this leaf.
    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Binary searches this leaf for `key`.
    #[inline]
    pub(crate) fn search<C: Compare<K>>(&self, key: &K, cmp: &C) -> SearchResult {
        match self.keys.binary_search_by(|k| cmp.compare(k, key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Inserts a key at the given position.
    pub(crate) fn insert(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    /// Removes and returns the key at the given position.
    pub(crate) fn remove(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    /// Pushes a key to the end.
    pub(crate) fn push(&mut self, key: K) {
        self.keys.push(key);
    }

    /// Pushes a key to the front.
    pub(crate) fn push_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    /// Pops the last key.
    pub(crate) fn pop(&mut self) -> Option<K> {
        self.keys.pop()
    }

    /// Pops the first key.
    pub(crate) fn pop_front(&mut self) -> Option<K> {
        if self.keys.is_empty() { None } else { Some(self.keys.remove(0)) }
    }

    /// Splits off the upper half. Returns the left half's new maximum (the
    /// separator) and the new right sibling.
    pub(crate) fn split(&mut self) -> (K, LeafNode<K>)
    where
        K: Clone,
    {
        let mid = self.keys.len() / 2;

        let mut right = LeafNode::new();
        right.keys = self.keys.drain(mid..).collect();

        let separator = self.keys.last().expect("`LeafNode::split()` - leaf has no keys!").clone();

        (separator, right)
    }

    /// Absorbs `right` and takes over its `next` link.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode<K>) {
        self.keys.append(&mut right.keys);
        self.next = right.next;
    }
}
