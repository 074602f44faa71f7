use std::ops::{Index, IndexMut};

/// Append-only node pool.
/// Tree nodes refer to each other by `ArenaSlot` instead of pointers,
/// so the whole structure is a plain `Vec` and can be cloned / sent freely.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    pool: Vec<T>,
}

/// Handle into an `Arena`.
/// Only valid for the arena that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaSlot {
    idx: u32,
}

impl ArenaSlot {
    fn new(index: usize) -> Self {
        Self { idx: index as u32 }
    }

    #[inline]
    pub fn index(self) -> usize {
        self.idx as usize
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self { pool: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Vec::with_capacity(capacity),
        }
    }

    pub fn alloc(&mut self, value: T) -> ArenaSlot {
        let idx = self.pool.len();
        self.pool.push(value);
        ArenaSlot::new(idx)
    }

    pub fn get(&self, slot: ArenaSlot) -> Option<&T> {
        self.pool.get(slot.index())
    }

    pub fn get_mut(&mut self, slot: ArenaSlot) -> Option<&mut T> {
        self.pool.get_mut(slot.index())
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// slots handed out by this arena are always in bounds
impl<T> Index<ArenaSlot> for Arena<T> {
    type Output = T;

    #[inline]
    fn index(&self, slot: ArenaSlot) -> &T {
        &self.pool[slot.index()]
    }
}

impl<T> IndexMut<ArenaSlot> for Arena<T> {
    #[inline]
    fn index_mut(&mut self, slot: ArenaSlot) -> &mut T {
        &mut self.pool[slot.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_sequential_slots() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena = Arena::with_capacity(4);
        let slot = arena.alloc(10u32);
        *arena.get_mut(slot).unwrap() += 5;
        arena[slot] *= 2;
        assert_eq!(arena[slot], 30);
    }
}
