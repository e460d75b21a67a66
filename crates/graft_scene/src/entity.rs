//! Entity - Generational handles for scene nodes
//!
//! Handles are only valid inside the scene that allocated them. A handle
//! whose slot has been freed and reused keeps its old generation, so stale
//! handles are detected instead of silently aliasing a new entity.

use core::fmt;

/// Entity identifier with generation for ABA protection
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Create a new entity handle
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Create an invalid/null entity
    #[inline]
    pub const fn null() -> Self {
        Self {
            index: u32::MAX,
            generation: u32::MAX,
        }
    }

    /// Get the slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if this is a null entity
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

/// Entity allocator with free list
#[derive(Default)]
pub struct EntityAllocator {
    /// Current generation of each slot
    generations: Vec<u32>,
    /// Whether each slot is occupied
    alive: Vec<bool>,
    /// Free slot indices
    free_list: Vec<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create a new entity allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity, reusing a freed slot if possible
    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;

        if let Some(index) = self.free_list.pop() {
            self.alive[index as usize] = true;
            Entity::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Entity::new(index, 0)
        }
    }

    /// Free an entity's slot. Returns false for stale or null handles.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = entity.index as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.alive[slot] = false;
        self.free_list.push(entity.index);
        self.alive_count -= 1;
        true
    }

    /// Check if an entity is alive
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        let slot = entity.index as usize;
        self.alive.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == entity.generation
    }

    /// Handle currently occupying a slot, if any
    pub fn handle_at(&self, index: u32) -> Option<Entity> {
        let slot = index as usize;
        if self.alive.get(slot).copied().unwrap_or(false) {
            Some(Entity::new(index, self.generations[slot]))
        } else {
            None
        }
    }

    /// Number of alive entities
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }
}
