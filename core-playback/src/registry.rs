//! Generational arena holding the items of a feed.
//!
//! Timer ticks and player callbacks reference items by [`ItemId`] only. A slot
//! reused after removal gets a new generation, so a stale id never reaches the
//! item that took its place.

use std::fmt;

/// Handle to an item stored in an [`ItemRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl ItemId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct ItemRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for ItemRegistry<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> ItemRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the value built by `make`, which receives the id it is stored
    /// under.
    pub fn insert_with(&mut self, make: impl FnOnce(ItemId) -> T) -> ItemId {
        match self.try_insert_with(|id| Ok::<T, std::convert::Infallible>(make(id))) {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    /// Fallible [`insert_with`](Self::insert_with). On error the slot is
    /// returned to the free list and nothing is stored.
    pub fn try_insert_with<E>(
        &mut self,
        make: impl FnOnce(ItemId) -> Result<T, E>,
    ) -> Result<ItemId, E> {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                ItemId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                ItemId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        match make(id) {
            Ok(value) => {
                self.slots[id.index as usize].value = Some(value);
                self.len += 1;
                Ok(id)
            }
            Err(err) => {
                self.free.push(id.index);
                Err(err)
            }
        }
    }

    pub fn insert(&mut self, value: T) -> ItemId {
        self.insert_with(|_| value)
    }

    pub fn remove(&mut self, id: ItemId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }

        let value = slot.value.take()?;
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    ItemId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ItemId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    ItemId {
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }
}

impl<T> fmt::Debug for ItemRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRegistry")
            .field("len", &self.len)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
