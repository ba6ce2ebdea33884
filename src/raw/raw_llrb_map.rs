use core::cmp::Ordering;

use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node};

/// The left-leaning red-black tree backing `RecordIndex`.
#[derive(Clone)]
pub(crate) struct RawLlrbMap<V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node>,
    /// Arena storing all payloads; nodes refer to them by handle.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Rotations and color flips applied since construction or the last `clear`.
    rebalance_events: u64,
}

/// Best candidates seen so far during a nearest-key descent.
#[derive(Default)]
struct Closest {
    distance: Option<u64>,
    nodes: SmallVec<[Handle; 2]>,
}

impl Closest {
    fn offer(mut self, node: Handle, distance: u64) -> Self {
        match self.distance.map(|best| distance.cmp(&best)) {
            None | Some(Ordering::Less) => {
                self.distance = Some(distance);
                self.nodes.clear();
                self.nodes.push(node);
            }
            Some(Ordering::Equal) => self.nodes.push(node),
            Some(Ordering::Greater) => {}
        }
        self
    }
}

impl<V> RawLlrbMap<V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            rebalance_events: 0,
        }
    }

    /// Creates a new tree with room for `capacity` entries before reallocating.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            rebalance_events: 0,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Drops every entry and resets the rebalancing counter.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.rebalance_events = 0;
    }

    pub(crate) const fn rebalance_events(&self) -> u64 {
        self.rebalance_events
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node {
        self.nodes.get(handle)
    }

    /// Returns the key and payload stored at a node.
    pub(crate) fn entry(&self, node: Handle) -> (i64, &V) {
        let node = self.nodes.get(node);
        (node.key, self.values.get(node.value))
    }

    /// Returns the node holding `key`, if any.
    pub(crate) fn search(&self, key: i64) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            match self.nodes.get(handle).child_toward(key) {
                Some(next) => current = next,
                None => return Some(handle),
            }
        }
        None
    }

    pub(crate) fn get(&self, key: i64) -> Option<&V> {
        let node = self.search(key)?;
        Some(self.values.get(self.nodes.get(node).value))
    }

    pub(crate) fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let node = self.search(key)?;
        let value = self.nodes.get(node).value;
        Some(self.values.get_mut(value))
    }

    /// Inserts a new entry. An existing key is left untouched and `value` is handed back.
    pub(crate) fn insert(&mut self, key: i64, value: V) -> Result<&mut V, V> {
        if self.search(key).is_some() {
            return Err(value);
        }

        let value = self.values.alloc(value);
        let root = self.insert_at(self.root, key, value);
        self.nodes.get_mut(root).color = Color::Black;
        self.root = Some(root);

        trace!(key, len = self.len(), rebalance_events = self.rebalance_events, "llrb_insert");
        Ok(self.values.get_mut(value))
    }

    fn insert_at(&mut self, subtree: Option<Handle>, key: i64, value: Handle) -> Handle {
        let Some(h) = subtree else {
            return self.nodes.alloc(Node::new(key, value));
        };

        if key < self.key(h) {
            let left = self.insert_at(self.left(h), key, value);
            self.nodes.get_mut(h).left = Some(left);
        } else {
            let right = self.insert_at(self.right(h), key, value);
            self.nodes.get_mut(h).right = Some(right);
        }

        self.fix_up(h)
    }

    /// Removes `key` and returns its payload.
    pub(crate) fn remove(&mut self, key: i64) -> Option<V> {
        let root = self.root?;
        self.search(key)?;

        // Let the descent start from a 3-node so a red link is available to push down.
        if !self.is_red(self.left(root)) && !self.is_red(self.right(root)) {
            self.nodes.get_mut(root).color = Color::Red;
        }

        let mut removed = None;
        self.root = self.remove_at(root, key, &mut removed);
        if let Some(root) = self.root {
            self.nodes.get_mut(root).color = Color::Black;
        }

        let removed = removed.expect("`RawLlrbMap::remove()` - located key was never unlinked!");
        trace!(key, len = self.len() - 1, rebalance_events = self.rebalance_events, "llrb_remove");
        Some(self.values.take(removed))
    }

    // `removed` receives the payload handle of whichever node ends up unlinked.
    fn remove_at(&mut self, h: Handle, key: i64, removed: &mut Option<Handle>) -> Option<Handle> {
        let mut h = h;

        if key < self.key(h) {
            let left = self.left(h);
            if !self.is_red(left) && !self.is_red(left.and_then(|l| self.left(l))) {
                h = self.move_red_left(h);
            }
            let left = self.left(h).expect("`RawLlrbMap::remove_at()` - key lies under a missing left child!");
            let left = self.remove_at(left, key, removed);
            self.nodes.get_mut(h).left = left;
        } else {
            if self.is_red(self.left(h)) {
                h = self.rotate_right(h);
            }
            if key == self.key(h) && self.right(h).is_none() {
                *removed = Some(self.nodes.take(h).value);
                return None;
            }

            let right = self.right(h);
            if !self.is_red(right) && !self.is_red(right.and_then(|r| self.left(r))) {
                h = self.move_red_right(h);
            }
            let right = self.right(h).expect("`RawLlrbMap::remove_at()` - key lies under a missing right child!");

            let right = if key == self.key(h) {
                // Pull the in-order successor up; its old node now carries the doomed payload.
                let successor = self.min_node(right);
                let (successor_key, successor_value) = {
                    let node = self.nodes.get(successor);
                    (node.key, node.value)
                };
                let node = self.nodes.get_mut(h);
                let doomed = core::mem::replace(&mut node.value, successor_value);
                node.key = successor_key;
                self.nodes.get_mut(successor).value = doomed;
                self.remove_min_at(right, removed)
            } else {
                self.remove_at(right, key, removed)
            };
            self.nodes.get_mut(h).right = right;
        }

        Some(self.fix_up(h))
    }

    fn remove_min_at(&mut self, h: Handle, removed: &mut Option<Handle>) -> Option<Handle> {
        let Some(left) = self.left(h) else {
            *removed = Some(self.nodes.take(h).value);
            return None;
        };

        let mut h = h;
        if !self.is_red(Some(left)) && !self.is_red(self.left(left)) {
            h = self.move_red_left(h);
        }
        let left = self.left(h).expect("`RawLlrbMap::remove_min_at()` - left child vanished!");
        let left = self.remove_min_at(left, removed);
        self.nodes.get_mut(h).left = left;

        Some(self.fix_up(h))
    }

    fn min_node(&self, mut h: Handle) -> Handle {
        while let Some(left) = self.left(h) {
            h = left;
        }
        h
    }

    /// Returns the node(s) whose key is closest to `target`, sorted by key.
    ///
    /// Only the search path for `target` is visited: the floor and ceiling of `target`
    /// both lie on it, and every closer-or-equal candidate is one of those two.
    pub(crate) fn nearest(&self, target: i64) -> SmallVec<[Handle; 2]> {
        let mut closest = Closest::default();
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            closest = closest.offer(handle, target.abs_diff(node.key));
            current = node.child_toward(target).flatten();
        }

        let mut nodes = closest.nodes;
        nodes.sort_unstable_by_key(|&handle| self.nodes.get(handle).key);
        nodes
    }

    // ─── Rebalancing ─────────────────────────────────────────────────────────

    /// Restores the left-leaning shape on the way back up from a mutation.
    fn fix_up(&mut self, h: Handle) -> Handle {
        let mut h = h;
        if self.is_red(self.right(h)) && !self.is_red(self.left(h)) {
            h = self.rotate_left(h);
        }
        if self.is_red(self.left(h)) && self.is_red(self.left(h).and_then(|l| self.left(l))) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.left(h)) && self.is_red(self.right(h)) {
            self.flip_colors(h);
        }
        h
    }

    fn rotate_left(&mut self, h: Handle) -> Handle {
        let x = self.right(h).expect("`RawLlrbMap::rotate_left()` - node has no right child!");
        let x_left = self.left(x);
        let color = self.nodes.get(h).color;

        let node = self.nodes.get_mut(h);
        node.right = x_left;
        node.color = Color::Red;

        let node = self.nodes.get_mut(x);
        node.left = Some(h);
        node.color = color;

        self.rebalance_events += 1;
        x
    }

    fn rotate_right(&mut self, h: Handle) -> Handle {
        let x = self.left(h).expect("`RawLlrbMap::rotate_right()` - node has no left child!");
        let x_right = self.right(x);
        let color = self.nodes.get(h).color;

        let node = self.nodes.get_mut(h);
        node.left = x_right;
        node.color = Color::Red;

        let node = self.nodes.get_mut(x);
        node.right = Some(h);
        node.color = color;

        self.rebalance_events += 1;
        x
    }

    fn flip_colors(&mut self, h: Handle) {
        let node = self.nodes.get_mut(h);
        node.color = node.color.flipped();
        let children = [node.left, node.right];

        for child in children.into_iter().flatten() {
            let child = self.nodes.get_mut(child);
            child.color = child.color.flipped();
        }

        self.rebalance_events += 1;
    }

    // Pushes a red link down the left spine so the left child is not a 2-node.
    fn move_red_left(&mut self, h: Handle) -> Handle {
        self.flip_colors(h);
        let right = self.right(h).expect("`RawLlrbMap::move_red_left()` - node has no right sibling!");
        if self.is_red(self.left(right)) {
            let right = self.rotate_right(right);
            self.nodes.get_mut(h).right = Some(right);
            let h = self.rotate_left(h);
            self.flip_colors(h);
            return h;
        }
        h
    }

    // Pushes a red link down the right spine so the right child is not a 2-node.
    fn move_red_right(&mut self, h: Handle) -> Handle {
        self.flip_colors(h);
        let left = self.left(h).expect("`RawLlrbMap::move_red_right()` - node has no left sibling!");
        if self.is_red(self.left(left)) {
            let h = self.rotate_right(h);
            self.flip_colors(h);
            return h;
        }
        h
    }

    // ─── Link accessors ──────────────────────────────────────────────────────

    #[inline]
    fn key(&self, h: Handle) -> i64 {
        self.nodes.get(h).key
    }

    #[inline]
    fn left(&self, h: Handle) -> Option<Handle> {
        self.nodes.get(h).left
    }

    #[inline]
    fn right(&self, h: Handle) -> Option<Handle> {
        self.nodes.get(h).right
    }

    /// Missing links count as black.
    #[inline]
    fn is_red(&self, link: Option<Handle>) -> bool {
        link.is_some_and(|h| self.nodes.get(h).is_red())
    }
}

/// In-order walk restricted to keys in `lo..=hi`.
///
/// Left subtrees are entered only when `lo < key` and right subtrees only when `hi > key`,
/// so subtrees that lie entirely outside the bounds are never touched.
#[derive(Clone)]
pub(crate) struct BoundedInOrder {
    stack: SmallVec<[Handle; 32]>,
    lo: i64,
    hi: i64,
}

impl BoundedInOrder {
    pub(crate) fn new<V>(tree: &RawLlrbMap<V>, lo: i64, hi: i64) -> Self {
        let mut walk = Self {
            stack: SmallVec::new(),
            lo,
            hi,
        };
        walk.descend(tree, tree.root());
        walk
    }

    pub(crate) fn empty() -> Self {
        Self {
            stack: SmallVec::new(),
            lo: 0,
            hi: -1,
        }
    }

    fn descend<V>(&mut self, tree: &RawLlrbMap<V>, mut link: Option<Handle>) {
        while let Some(handle) = link {
            let node = tree.node(handle);
            if node.key < self.lo {
                link = node.right;
                continue;
            }
            self.stack.push(handle);
            link = if self.lo < node.key { node.left } else { None };
        }
    }

    pub(crate) fn next_node<V>(&mut self, tree: &RawLlrbMap<V>) -> Option<Handle> {
        let handle = self.stack.pop()?;
        let node = tree.node(handle);
        if node.key > self.hi {
            self.stack.clear();
            return None;
        }
        if self.hi > node.key {
            self.descend(tree, node.right);
        }
        Some(handle)
    }
}
