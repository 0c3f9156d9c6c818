use alloc::vec::Vec;

use super::handle::Handle;

enum Slot<T> {
    Occupied(T),
    // Vacant slots form an intrusive free list.
    Vacant { next_free: Option<Handle> },
}

/// Slab of tree nodes addressed by [`Handle`]. Freed slots are recycled
/// before the backing vector grows.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    /// Counts occupied slots. Linear.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| matches!(slot, Slot::Occupied(_))).count()
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free_head {
            let slot = &mut self.slots[handle.to_index()];
            let Slot::Vacant { next_free } = *slot else {
                panic!("`Arena::alloc()` - free list points at an occupied slot!");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.slots[handle.to_index()] {
            Slot::Occupied(element) => element,
            Slot::Vacant { .. } => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match core::mem::replace(&mut self.slots[handle.to_index()], vacant) {
            Slot::Occupied(element) => {
                self.free_head = Some(handle);
                element
            }
            Slot::Vacant { next_free } => {
                // Undo before reporting so the free list stays intact.
                self.slots[handle.to_index()] = Slot::Vacant { next_free };
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
    }
}
