use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::StructureError;
use crate::utils::datastruct::arena::{Arena, ArenaSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    fn flip(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<ArenaSlot>,
    right: Option<ArenaSlot>,
    color: Color,
    /// number of nodes in the subtree rooted here
    size: usize,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            size: 1,
        }
    }
}

/// OrderedMap
/// Left-leaning red-black tree with subtree sizes, stored in an arena.
///
/// Besides the usual map operations it answers order-statistics queries:
/// `rank(key)` is the number of keys strictly smaller than `key`, and
/// `select(i)` is the key at sorted position `i`. Both run in O(log n) and
/// `select(rank(k)) == k` for every key present.
///
/// Nodes are never removed, so a rank handed out stays valid as long as no
/// further keys are inserted. The learner relies on that after freezing a map.
///
/// # Examples
/// ```
/// use nb_feature_classifier::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.put("market".to_string(), 3u64);
/// map.put("game".to_string(), 1);
/// map.put("team".to_string(), 2);
///
/// assert_eq!(map.rank("market"), 1);
/// assert_eq!(map.select(2).unwrap(), "team");
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["game", "market", "team"]);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    nodes: Arena<Node<K, V>>,
    root: Option<ArenaSlot>,
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        OrderedMap {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// number of keys
    #[inline]
    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// In-order iterator over `(key, value)`.
    /// Every call starts a fresh traversal.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
            remaining: self.len(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn min_key(&self) -> Option<&K> {
        let mut x = self.root?;
        while let Some(left) = self.nodes[x].left {
            x = left;
        }
        Some(&self.nodes[x].key)
    }

    pub fn max_key(&self) -> Option<&K> {
        let mut x = self.root?;
        while let Some(right) = self.nodes[x].right {
            x = right;
        }
        Some(&self.nodes[x].key)
    }

    /// Key and value at sorted position `index`.
    pub fn select_entry(&self, index: usize) -> Result<(&K, &V), StructureError> {
        let len = self.len();
        if index >= len {
            return Err(StructureError::IndexOutOfRange { index, len });
        }
        let mut remaining = index;
        let mut x = self.root;
        while let Some(slot) = x {
            let node = &self.nodes[slot];
            let left_size = self.size_of(node.left);
            match remaining.cmp(&left_size) {
                Ordering::Less => x = node.left,
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    x = node.right;
                }
                Ordering::Equal => return Ok((&node.key, &node.value)),
            }
        }
        // subtree sizes disagree with the shape of the tree
        Err(StructureError::IndexOutOfRange { index, len })
    }

    /// Key at sorted position `index`.
    #[inline]
    pub fn select(&self, index: usize) -> Result<&K, StructureError> {
        self.select_entry(index).map(|(key, _)| key)
    }

    /// Height of the tree (empty tree is 0).
    /// Stays within `2 * log2(n + 1)` for a red-black tree.
    pub fn height(&self) -> usize {
        fn height_at<K, V>(nodes: &Arena<Node<K, V>>, slot: Option<ArenaSlot>) -> usize {
            match slot {
                None => 0,
                Some(s) => {
                    1 + height_at(nodes, nodes[s].left).max(height_at(nodes, nodes[s].right))
                }
            }
        }
        height_at(&self.nodes, self.root)
    }

    #[inline]
    fn size_of(&self, slot: Option<ArenaSlot>) -> usize {
        slot.map_or(0, |s| self.nodes[s].size)
    }

    #[inline]
    fn is_red(&self, slot: Option<ArenaSlot>) -> bool {
        slot.map_or(false, |s| self.nodes[s].color == Color::Red)
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Ord,
{
    /// Insert or overwrite.
    /// Returns the previous value when the key was already present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_slot(key, value).1
    }

    fn put_slot(&mut self, key: K, value: V) -> (ArenaSlot, Option<V>) {
        let mut touched = None;
        let mut old = None;
        let root = self.put_at(self.root, key, value, &mut touched, &mut old);
        self.nodes[root].color = Color::Black;
        self.root = Some(root);
        // put_at always records the slot it allocated or overwrote
        (touched.unwrap_or(root), old)
    }

    fn put_at(
        &mut self,
        h: Option<ArenaSlot>,
        key: K,
        value: V,
        touched: &mut Option<ArenaSlot>,
        old: &mut Option<V>,
    ) -> ArenaSlot {
        let h = match h {
            None => {
                let slot = self.nodes.alloc(Node::new(key, value));
                *touched = Some(slot);
                return slot;
            }
            Some(h) => h,
        };
        match key.cmp(&self.nodes[h].key) {
            Ordering::Less => {
                let left = self.put_at(self.nodes[h].left, key, value, touched, old);
                self.nodes[h].left = Some(left);
            }
            Ordering::Greater => {
                let right = self.put_at(self.nodes[h].right, key, value, touched, old);
                self.nodes[h].right = Some(right);
            }
            Ordering::Equal => {
                *old = Some(std::mem::replace(&mut self.nodes[h].value, value));
                *touched = Some(h);
            }
        }
        self.balance(h)
    }

    fn balance(&mut self, mut h: ArenaSlot) -> ArenaSlot {
        if self.is_red(self.nodes[h].right) && !self.is_red(self.nodes[h].left) {
            h = self.rotate_left(h);
        }
        let left = self.nodes[h].left;
        if self.is_red(left) && self.is_red(left.and_then(|l| self.nodes[l].left)) {
            h = self.rotate_right(h);
        }
        if self.is_red(self.nodes[h].left) && self.is_red(self.nodes[h].right) {
            self.flip_colors(h);
        }
        self.nodes[h].size =
            1 + self.size_of(self.nodes[h].left) + self.size_of(self.nodes[h].right);
        h
    }

    fn rotate_left(&mut self, h: ArenaSlot) -> ArenaSlot {
        let Some(x) = self.nodes[h].right else {
            return h;
        };
        self.nodes[h].right = self.nodes[x].left;
        self.nodes[x].left = Some(h);
        self.nodes[x].color = self.nodes[h].color;
        self.nodes[h].color = Color::Red;
        self.nodes[x].size = self.nodes[h].size;
        self.nodes[h].size =
            1 + self.size_of(self.nodes[h].left) + self.size_of(self.nodes[h].right);
        x
    }

    fn rotate_right(&mut self, h: ArenaSlot) -> ArenaSlot {
        let Some(x) = self.nodes[h].left else {
            return h;
        };
        self.nodes[h].left = self.nodes[x].right;
        self.nodes[x].right = Some(h);
        self.nodes[x].color = self.nodes[h].color;
        self.nodes[h].color = Color::Red;
        self.nodes[x].size = self.nodes[h].size;
        self.nodes[h].size =
            1 + self.size_of(self.nodes[h].left) + self.size_of(self.nodes[h].right);
        x
    }

    fn flip_colors(&mut self, h: ArenaSlot) {
        self.nodes[h].color = self.nodes[h].color.flip();
        for child in [self.nodes[h].left, self.nodes[h].right].into_iter().flatten() {
            self.nodes[child].color = self.nodes[child].color.flip();
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<ArenaSlot>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut x = self.root;
        while let Some(slot) = x {
            let node = &self.nodes[slot];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => x = node.left,
                Ordering::Greater => x = node.right,
                Ordering::Equal => return Some(slot),
            }
        }
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&V, StructureError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key)
            .map(|slot| &self.nodes[slot].value)
            .ok_or(StructureError::KeyNotFound)
    }

    /// Total membership query, never fails.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Value for `key`, inserting `default()` first when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        if let Some(slot) = self.find(&key) {
            return &mut self.nodes[slot].value;
        }
        let (slot, _) = self.put_slot(key, default());
        &mut self.nodes[slot].value
    }

    /// Number of keys strictly less than `key`.
    /// Defined for absent keys too (insertion position).
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut rank = 0;
        let mut x = self.root;
        while let Some(slot) = x {
            let node = &self.nodes[slot];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => x = node.left,
                Ordering::Greater => {
                    rank += 1 + self.size_of(node.left);
                    x = node.right;
                }
                Ordering::Equal => return rank + self.size_of(node.left),
            }
        }
        rank
    }

    /// Rank of a key that must be present.
    pub fn rank_of<Q>(&self, key: &Q) -> Result<usize, StructureError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.contains(key) {
            Ok(self.rank(key))
        } else {
            Err(StructureError::KeyNotFound)
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order traversal with an explicit stack of pending left spines.
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    stack: Vec<ArenaSlot>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut slot: Option<ArenaSlot>) {
        while let Some(s) = slot {
            self.stack.push(s);
            slot = self.nodes[s].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.stack.pop()?;
        let nodes = self.nodes;
        self.push_left_spine(nodes[slot].right);
        self.remaining -= 1;
        let node = &nodes[slot];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
