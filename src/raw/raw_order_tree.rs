use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, MAX_KEYS, Node, SearchResult};
use crate::comparator::Compare;

/// Order-statistic B+tree over unique keys.
///
/// All keys live in leaves, which are chained for in-order iteration.
/// Internal nodes cache the size of every child subtree so that rank
/// lookups descend a single path.
pub(crate) struct RawOrderTree<K, C> {
    nodes: Arena<Node<K>>,
    root: Option<Handle>,
    len: usize,
    first_leaf: Option<Handle>,
    last_leaf: Option<Handle>,
    cmp: C,
}

struct PathElement {
    node: Handle,
    child_index: usize,
}

type Path = SmallVec<[PathElement; 16]>;

impl<K, C> RawOrderTree<K, C> {
    pub(crate) const fn new(cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            first_leaf: None,
            last_leaf: None,
            cmp,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.cmp
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.first_leaf = None;
        self.last_leaf = None;
    }

    /// Iterates over all keys in ascending order by walking the leaf chain.
    pub(crate) fn iter(&self) -> Iter<'_, K> {
        Iter {
            nodes: &self.nodes,
            front: self.first_leaf,
            front_index: 0,
            back: self.last_leaf,
            back_index: self.last_leaf.map_or(0, |leaf| self.nodes.get(leaf).as_leaf().key_count()),
            remaining: self.len,
        }
    }

    /// Returns the key at zero-based position `rank` in ascending order.
    pub(crate) fn get_by_rank(&self, rank: usize) -> Option<&K> {
        if rank >= self.len {
            return None;
        }

        let mut current = self.root?;
        let mut remaining = rank;

        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    let (child_index, child_rank) = internal.child_for_rank(remaining)?;
                    current = internal.child(child_index);
                    remaining = child_rank;
                }
                Node::Leaf(leaf) => return leaf.keys().get(remaining),
            }
        }
    }
}

impl<K: Clone, C: Compare<K>> RawOrderTree<K, C> {
    /// Walks from `root` to the leaf responsible for `key`, recording the path.
    fn descend(&self, root: Handle, key: &K) -> (Handle, Path) {
        let mut path: Path = SmallVec::new();
        let mut current = root;

        while let Node::Internal(internal) = self.nodes.get(current) {
            let child_index = internal.search_child(key, &self.cmp);
            path.push(PathElement {
                node: current,
                child_index,
            });
            current = internal.child(child_index);
        }

        (current, path)
    }

    /// Counts the keys that sort strictly before `key`.
    pub(crate) fn count_less(&self, key: &K) -> usize {
        let Some(mut current) = self.root else {
            return 0;
        };
        let mut rank = 0;

        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => {
                    let child_index = internal.search_child(key, &self.cmp);
                    rank += internal.size_before(child_index);
                    current = internal.child(child_index);
                }
                Node::Leaf(leaf) => {
                    return match leaf.search(key, &self.cmp) {
                        SearchResult::Found(idx) | SearchResult::NotFound(idx) => rank + idx,
                    };
                }
            }
        }
    }

    /// Inserts `key`. Returns false, leaving the tree untouched, if an equal
    /// key is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let Some(root) = self.root else {
            let mut leaf = LeafNode::new();
            leaf.push(key);
            let leaf_handle = self.nodes.alloc(Node::Leaf(leaf));
            self.root = Some(leaf_handle);
            self.first_leaf = Some(leaf_handle);
            self.last_leaf = Some(leaf_handle);
            self.len = 1;
            return true;
        };

        let (leaf_handle, mut path) = self.descend(root, &key);

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let idx = match leaf.search(&key, &self.cmp) {
            SearchResult::Found(_) => return false,
            SearchResult::NotFound(idx) => idx,
        };
        leaf.insert(idx, key);
        self.len += 1;

        if leaf.key_count() > MAX_KEYS {
            self.split_leaf(leaf_handle, &mut path);
        } else {
            for elem in path.iter().rev() {
                self.nodes.get_mut(elem.node).as_internal_mut().grow_child(elem.child_index);
            }
        }

        true
    }

    fn split_leaf(&mut self, leaf_handle: Handle, path: &mut Path) {
        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let (separator, mut right_leaf) = leaf.split();
        let left_size = leaf.key_count();
        let right_size = right_leaf.key_count();

        let old_next = leaf.next();
        right_leaf.set_prev(Some(leaf_handle));
        right_leaf.set_next(old_next);

        let right_handle = self.nodes.alloc(Node::Leaf(right_leaf));
        self.nodes.get_mut(leaf_handle).as_leaf_mut().set_next(Some(right_handle));

        match old_next {
            Some(old_next) => self.nodes.get_mut(old_next).as_leaf_mut().set_prev(Some(right_handle)),
            None => self.last_leaf = Some(right_handle),
        }

        self.propagate_split(path, separator, right_handle, left_size, right_size);
    }

    fn propagate_split(
        &mut self,
        path: &mut Path,
        mut separator: K,
        mut new_child: Handle,
        mut left_size: usize,
        mut right_size: usize,
    ) {
        while let Some(elem) = path.pop() {
            let parent = self.nodes.get_mut(elem.node).as_internal_mut();
            parent.set_child_size(elem.child_index, left_size);
            parent.insert_child(elem.child_index, separator, new_child, right_size);
            parent.update_size();

            if parent.key_count() <= MAX_KEYS {
                self.refresh_sizes(path);
                return;
            }

            let (median, right_internal) = parent.split();
            left_size = parent.size();
            right_size = right_internal.size();

            separator = median;
            new_child = self.nodes.alloc(Node::Internal(right_internal));
        }

        // The root itself split.
        let Some(old_root) = self.root else {
            unreachable!("`RawOrderTree::propagate_split()` - split in an empty tree!");
        };
        let mut new_root = InternalNode::new();
        new_root.set_first_child(old_root, left_size);
        new_root.push_child(separator, new_child, right_size);
        new_root.update_size();

        self.root = Some(self.nodes.alloc(Node::Internal(new_root)));
    }

    /// Recomputes the cached sizes along `path`, bottom-up.
    fn refresh_sizes(&mut self, path: &Path) {
        for elem in path.iter().rev() {
            let child = self.nodes.get(elem.node).as_internal().child(elem.child_index);
            let child_size = self.nodes.get(child).subtree_size();
            let parent = self.nodes.get_mut(elem.node).as_internal_mut();
            parent.set_child_size(elem.child_index, child_size);
            parent.update_size();
        }
    }

    /// Removes the key equal to `key` and returns it.
    pub(crate) fn remove(&mut self, key: &K) -> Option<K> {
        let root = self.root?;
        let (leaf_handle, mut path) = self.descend(root, key);

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        let SearchResult::Found(idx) = leaf.search(key, &self.cmp) else {
            return None;
        };
        let removed = leaf.remove(idx);
        self.len -= 1;

        if self.len == 0 {
            self.clear();
            return Some(removed);
        }

        let leaf = self.nodes.get(leaf_handle).as_leaf();
        if path.is_empty() || !leaf.is_at_minimum() {
            self.refresh_separator(leaf_handle, &path);
            self.refresh_sizes(&path);
        } else {
            self.rebalance_leaf(leaf_handle, &mut path);
        }

        Some(removed)
    }

    /// Tightens the separator bounding `leaf_handle` to its current maximum.
    fn refresh_separator(&mut self, leaf_handle: Handle, path: &Path) {
        let Some(last_key) = self.nodes.get(leaf_handle).as_leaf().last_key().cloned() else {
            return;
        };

        // The bounding separator sits in the nearest ancestor where we did
        // not descend into the rightmost child.
        for elem in path.iter().rev() {
            let parent = self.nodes.get_mut(elem.node).as_internal_mut();
            if elem.child_index < parent.key_count() {
                parent.set_key(elem.child_index, last_key);
                break;
            }
        }
    }

    fn rebalance_leaf(&mut self, leaf_handle: Handle, path: &mut Path) {
        let Some(&PathElement {
            node: parent_handle,
            child_index,
        }) = path.last()
        else {
            return;
        };
        let parent = self.nodes.get(parent_handle).as_internal();

        if child_index > 0 {
            let left_handle = parent.child(child_index - 1);
            if self.nodes.get(left_handle).as_leaf().can_lend() {
                self.borrow_from_left_leaf(leaf_handle, left_handle, parent_handle, child_index);
                self.refresh_sizes(path);
                return;
            }
        }

        if child_index + 1 < parent.child_count() {
            let right_handle = parent.child(child_index + 1);
            if self.nodes.get(right_handle).as_leaf().can_lend() {
                self.borrow_from_right_leaf(leaf_handle, right_handle, parent_handle, child_index);
                self.refresh_sizes(path);
                return;
            }
        }

        if child_index > 0 {
            let left_handle = parent.child(child_index - 1);
            self.merge_leaves(left_handle, leaf_handle, path, child_index - 1);
        } else {
            let right_handle = parent.child(child_index + 1);
            self.merge_leaves(leaf_handle, right_handle, path, child_index);
        }
    }

    fn borrow_from_left_leaf(&mut self, leaf_handle: Handle, left_handle: Handle, parent_handle: Handle, child_index: usize) {
        let left = self.nodes.get_mut(left_handle).as_leaf_mut();
        let key = left.pop().expect("`borrow_from_left_leaf()` - lender is empty!");
        let left_size = left.key_count();
        let left_last = left.last_key().expect("`borrow_from_left_leaf()` - lender drained!").clone();

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        leaf.push_front(key);
        let leaf_size = leaf.key_count();

        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.set_key(child_index - 1, left_last);
        parent.set_child_size(child_index - 1, left_size);
        parent.set_child_size(child_index, leaf_size);
    }

    fn borrow_from_right_leaf(&mut self, leaf_handle: Handle, right_handle: Handle, parent_handle: Handle, child_index: usize) {
        let right = self.nodes.get_mut(right_handle).as_leaf_mut();
        let key = right.pop_front().expect("`borrow_from_right_leaf()` - lender is empty!");
        let right_size = right.key_count();

        let leaf = self.nodes.get_mut(leaf_handle).as_leaf_mut();
        leaf.push(key.clone());
        let leaf_size = leaf.key_count();

        // The borrowed key is now the maximum of the underfull leaf.
        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.set_key(child_index, key);
        parent.set_child_size(child_index, leaf_size);
        parent.set_child_size(child_index + 1, right_size);
    }

    fn merge_leaves(&mut self, left_handle: Handle, right_handle: Handle, path: &mut Path, separator_index: usize) {
        let Node::Leaf(right) = self.nodes.take(right_handle) else {
            panic!("expected leaf node");
        };

        let left = self.nodes.get_mut(left_handle).as_leaf_mut();
        left.merge_with_right(right);

        match left.next() {
            Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(left_handle)),
            None => self.last_leaf = Some(left_handle),
        }

        self.remove_separator(path, separator_index);
    }

    /// Drops separator `separator_index` (and the child right of it) from the
    /// parent at the top of `path`, then repairs the parent if it underflows.
    fn remove_separator(&mut self, path: &mut Path, separator_index: usize) {
        let Some(PathElement { node: parent_handle, .. }) = path.pop() else {
            unreachable!("`RawOrderTree::remove_separator()` - merge without a parent!");
        };

        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.remove_child(separator_index);
        let merged = parent.child(separator_index);
        let merged_size = self.nodes.get(merged).subtree_size();
        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.set_child_size(separator_index, merged_size);
        parent.update_size();

        if path.is_empty() {
            if parent.child_count() == 1 {
                // A root with one child is redundant.
                let new_root = parent.child(0);
                self.nodes.free(parent_handle);
                self.root = Some(new_root);
            }
            return;
        }

        if parent.is_at_minimum() {
            self.rebalance_internal(parent_handle, path);
        } else {
            self.refresh_sizes(path);
        }
    }

    fn rebalance_internal(&mut self, node_handle: Handle, path: &mut Path) {
        let Some(&PathElement {
            node: parent_handle,
            child_index,
        }) = path.last()
        else {
            return;
        };
        let parent = self.nodes.get(parent_handle).as_internal();

        if child_index > 0 {
            let left_handle = parent.child(child_index - 1);
            if self.nodes.get(left_handle).as_internal().can_lend() {
                self.borrow_from_left_internal(node_handle, left_handle, parent_handle, child_index);
                self.refresh_sizes(path);
                return;
            }
        }

        if child_index + 1 < parent.child_count() {
            let right_handle = parent.child(child_index + 1);
            if self.nodes.get(right_handle).as_internal().can_lend() {
                self.borrow_from_right_internal(node_handle, right_handle, parent_handle, child_index);
                self.refresh_sizes(path);
                return;
            }
        }

        if child_index > 0 {
            let left_handle = parent.child(child_index - 1);
            self.merge_internals(left_handle, node_handle, path, child_index - 1);
        } else {
            let right_handle = parent.child(child_index + 1);
            self.merge_internals(node_handle, right_handle, path, child_index);
        }
    }

    fn borrow_from_left_internal(&mut self, node_handle: Handle, left_handle: Handle, parent_handle: Handle, child_index: usize) {
        let parent_separator = self.nodes.get(parent_handle).as_internal().key(child_index - 1).clone();

        let left = self.nodes.get_mut(left_handle).as_internal_mut();
        let (left_key, left_child, left_child_size) =
            left.pop_child().expect("`borrow_from_left_internal()` - lender is empty!");
        left.update_size();
        let left_size = left.size();

        let node = self.nodes.get_mut(node_handle).as_internal_mut();
        node.push_child_front(parent_separator, node.child(0), node.child_size(0));
        node.set_first_child(left_child, left_child_size);
        node.update_size();
        let node_size = node.size();

        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.set_key(child_index - 1, left_key);
        parent.set_child_size(child_index - 1, left_size);
        parent.set_child_size(child_index, node_size);
    }

    fn borrow_from_right_internal(&mut self, node_handle: Handle, right_handle: Handle, parent_handle: Handle, child_index: usize) {
        let parent_separator = self.nodes.get(parent_handle).as_internal().key(child_index).clone();

        let right = self.nodes.get_mut(right_handle).as_internal_mut();
        let (right_key, right_child, right_child_size) =
            right.pop_child_front().expect("`borrow_from_right_internal()` - lender is empty!");
        right.update_size();
        let right_size = right.size();

        let node = self.nodes.get_mut(node_handle).as_internal_mut();
        node.push_child(parent_separator, right_child, right_child_size);
        node.update_size();
        let node_size = node.size();

        let parent = self.nodes.get_mut(parent_handle).as_internal_mut();
        parent.set_key(child_index, right_key);
        parent.set_child_size(child_index, node_size);
        parent.set_child_size(child_index + 1, right_size);
    }

    fn merge_internals(&mut self, left_handle: Handle, right_handle: Handle, path: &mut Path, separator_index: usize) {
        let Some(&PathElement { node: parent_handle, .. }) = path.last() else {
            unreachable!("`RawOrderTree::merge_internals()` - merge without a parent!");
        };
        let separator = self.nodes.get(parent_handle).as_internal().key(separator_index).clone();

        let Node::Internal(right) = self.nodes.take(right_handle) else {
            panic!("expected internal node");
        };
        self.nodes.get_mut(left_handle).as_internal_mut().merge_with_right(separator, right);

        self.remove_separator(path, separator_index);
    }
}

/// Ascending iterator over the keys of a [`RawOrderTree`].
pub(crate) struct Iter<'a, K> {
    nodes: &'a Arena<Node<K>>,
    front: Option<Handle>,
    front_index: usize,
    back: Option<Handle>,
    // Exclusive.
    back_index: usize,
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let leaf = self.nodes.get(self.front?).as_leaf();
            if let Some(key) = leaf.keys().get(self.front_index) {
                self.front_index += 1;
                self.remaining -= 1;
                return Some(key);
            }
            self.front = leaf.next();
            self.front_index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            let leaf = self.nodes.get(self.back?).as_leaf();
            if self.back_index > 0 {
                self.back_index -= 1;
                self.remaining -= 1;
                return leaf.keys().get(self.back_index);
            }
            self.back = leaf.prev();
            self.back_index = self.back.map_or(0, |prev| self.nodes.get(prev).as_leaf().key_count());
        }
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::comparator::{Natural, natural};
    use alloc::collections::BTreeSet;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cmp::Ordering;
    use proptest::prelude::*;

    impl<K: Clone, C: Compare<K>> RawOrderTree<K, C> {
        /// Whether `a` sorts strictly before `b` under the tree's comparator.
        fn precedes(&self, a: &K, b: &K) -> bool {
            self.cmp.compare(a, b) == Ordering::Less
        }

        fn is_sorted(&self) -> bool {
            let mut iter = self.iter();
            let Some(mut previous) = iter.next() else {
                return true;
            };
            for key in iter {
                if !self.precedes(previous, key) {
                    return false;
                }
                previous = key;
            }
            true
        }

        /// Checks every structural invariant and panics listing the violations.
        fn validate_invariants(&self) {
            let Some(root) = self.root else {
                assert_eq!(self.len, 0, "empty tree should have len 0");
                assert!(self.first_leaf.is_none(), "empty tree should have no first_leaf");
                assert!(self.last_leaf.is_none(), "empty tree should have no last_leaf");
                return;
            };

            let mut errors: Vec<String> = Vec::new();
            let mut leaves: Vec<Handle> = Vec::new();
            let mut leaf_depth: Option<usize> = None;
            let size = self.validate_node(root, 0, &mut leaf_depth, &mut leaves, &mut errors);

            if size != self.len {
                errors.push(alloc::format!("len mismatch: len={}, counted={size}", self.len));
            }
            if self.first_leaf != leaves.first().copied() {
                errors.push(alloc::format!("first_leaf mismatch: {:?}", self.first_leaf));
            }
            if self.last_leaf != leaves.last().copied() {
                errors.push(alloc::format!("last_leaf mismatch: {:?}", self.last_leaf));
            }
            for (i, &handle) in leaves.iter().enumerate() {
                let leaf = self.nodes.get(handle).as_leaf();
                let expected_prev = i.checked_sub(1).map(|p| leaves[p]);
                let expected_next = leaves.get(i + 1).copied();
                if leaf.prev() != expected_prev || leaf.next() != expected_next {
                    errors.push(alloc::format!("leaf chain broken at leaf {i}"));
                }
            }
            if !self.is_sorted() {
                errors.push("keys out of order".into());
            }
            if self.nodes.len() != self.count_nodes(root) {
                errors.push(alloc::format!("arena holds {} nodes but tree reaches fewer", self.nodes.len()));
            }

            assert!(errors.is_empty(), "tree invariant violations:\n{}", errors.join("\n"));
        }

        fn validate_node(
            &self,
            handle: Handle,
            depth: usize,
            leaf_depth: &mut Option<usize>,
            leaves: &mut Vec<Handle>,
            errors: &mut Vec<String>,
        ) -> usize {
            match self.nodes.get(handle) {
                Node::Leaf(leaf) => {
                    match *leaf_depth {
                        None => *leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            errors.push(alloc::format!("leaf depth {depth}, expected {expected}"));
                        }
                        Some(_) => {}
                    }
                    leaves.push(handle);
                    leaf.key_count()
                }
                Node::Internal(internal) => {
                    let mut total = 0;
                    for i in 0..internal.child_count() {
                        let child = internal.child(i);
                        let actual = self.validate_node(child, depth + 1, leaf_depth, leaves, errors);
                        if internal.child_size(i) != actual {
                            errors.push(alloc::format!(
                                "child size mismatch at {handle:?}[{i}]: stored={}, actual={actual}",
                                internal.child_size(i)
                            ));
                        }
                        // Separators may be stale after removals but must still partition.
                        if i < internal.key_count() {
                            let separator = internal.key(i);
                            let first_right = self.first_key(internal.child(i + 1));
                            if self.precedes(separator, &self.last_key(child)) {
                                errors.push(alloc::format!("separator {i} below its child at {handle:?}"));
                            }
                            if !self.precedes(separator, &first_right) {
                                errors.push(alloc::format!("separator {i} not below right sibling at {handle:?}"));
                            }
                        }
                        total += actual;
                    }
                    if internal.size() != total {
                        errors.push(alloc::format!("internal size mismatch at {handle:?}"));
                    }
                    total
                }
            }
        }

        fn first_key(&self, mut handle: Handle) -> K {
            loop {
                match self.nodes.get(handle) {
                    Node::Internal(internal) => handle = internal.child(0),
                    Node::Leaf(leaf) => return leaf.keys()[0].clone(),
                }
            }
        }

        fn last_key(&self, mut handle: Handle) -> K {
            loop {
                match self.nodes.get(handle) {
                    Node::Internal(internal) => handle = internal.child(internal.child_count() - 1),
                    Node::Leaf(leaf) => return leaf.last_key().expect("leaf should not be empty").clone(),
                }
            }
        }

        fn count_nodes(&self, handle: Handle) -> usize {
            match self.nodes.get(handle) {
                Node::Leaf(_) => 1,
                Node::Internal(internal) => {
                    1 + (0..internal.child_count()).map(|i| self.count_nodes(internal.child(i))).sum::<usize>()
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_matches_btreeset(ops in prop::collection::vec(op_strategy(), 0..600)) {
            let mut tree = RawOrderTree::new(natural());
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => prop_assert_eq!(tree.insert(key), model.insert(key)),
                    Op::Remove(key) => prop_assert_eq!(tree.remove(&key), model.take(&key)),
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let keys: Vec<i32> = tree.iter().copied().collect();
            let expected: Vec<i32> = model.iter().copied().collect();
            prop_assert_eq!(keys, expected);

            let reversed: Vec<i32> = tree.iter().rev().copied().collect();
            let expected: Vec<i32> = model.iter().rev().copied().collect();
            prop_assert_eq!(reversed, expected);
        }

        #[test]
        fn get_by_rank_matches_sorted_order(ops in prop::collection::vec(op_strategy(), 1..400)) {
            let mut tree = RawOrderTree::new(natural());
            let mut model = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => { tree.insert(key); model.insert(key); }
                    Op::Remove(key) => { tree.remove(&key); model.remove(&key); }
                }
            }

            for (rank, key) in model.iter().enumerate() {
                prop_assert_eq!(tree.get_by_rank(rank), Some(key), "rank {}", rank);
            }
            prop_assert!(tree.get_by_rank(model.len()).is_none());
        }

        #[test]
        fn count_less_matches_model(
            keys in prop::collection::vec(0i32..500, 0..300),
            probes in prop::collection::vec(-10i32..510, 1..50),
        ) {
            let mut tree = RawOrderTree::new(natural());
            let mut model = BTreeSet::new();
            for key in keys {
                tree.insert(key);
                model.insert(key);
            }

            for probe in probes {
                prop_assert_eq!(tree.count_less(&probe), model.range(..probe).count(), "probe {}", probe);
            }
        }
    }

    #[test]
    fn empty_tree_queries() {
        let tree: RawOrderTree<i32, Natural<i32>> = RawOrderTree::new(natural());
        tree.validate_invariants();
        assert!(tree.is_empty());
        assert!(tree.get_by_rank(0).is_none());
        assert_eq!(tree.count_less(&7), 0);
        assert_eq!(tree.iter().len(), 0);
    }

    #[test]
    fn reversed_comparator_orders_descending() {
        let mut tree = RawOrderTree::new(natural::<i32>().rev());
        for key in [3, 9, 1, 7] {
            tree.insert(key);
        }
        tree.validate_invariants();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [9, 7, 3, 1]);
        assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), [1, 3, 7, 9]);
        assert_eq!(tree.get_by_rank(0), Some(&9));
    }

    #[test]
    fn ranks_stable_after_rebalancing() {
        let mut tree = RawOrderTree::new(natural());
        for i in 0..200 {
            tree.insert(i);
            tree.validate_invariants();
        }

        for i in (0..200).step_by(3) {
            assert_eq!(tree.remove(&i), Some(i));
            tree.validate_invariants();
        }

        let remaining: Vec<i32> = (0..200).filter(|i| i % 3 != 0).collect();
        for (rank, key) in remaining.iter().enumerate() {
            assert_eq!(tree.count_less(key), rank, "rank of {key}");
            assert_eq!(tree.get_by_rank(rank), Some(key));
        }
    }

    #[test]
    fn drain_to_empty_and_refill() {
        let mut tree = RawOrderTree::new(natural());
        for i in 0..100 {
            tree.insert(i);
        }
        for i in (0..100).rev() {
            assert_eq!(tree.remove(&i), Some(i));
            tree.validate_invariants();
        }
        assert!(tree.is_empty());
        assert!(tree.insert(5));
        tree.validate_invariants();
        assert_eq!(tree.get_by_rank(0), Some(&5));
    }
}
