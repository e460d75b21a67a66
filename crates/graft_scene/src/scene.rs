//! Scene - In-memory entity tree
//!
//! The Scene is the reference host for the snapshot pipeline. Each entity has
//! a name, an optional parent, an ordered child list, a local transform and
//! an ordered list of behaviours. Behaviours are addressed by a
//! [`BehaviourId`] that stays valid for as long as the instance is attached,
//! so removing one behaviour never shifts the handles of the others.

use core::fmt;

use graft_core::HandleError;
use graft_math::Transform;

use crate::behaviour::{Behaviour, BehaviourType};
use crate::entity::{Entity, EntityAllocator};

/// Stable id of an attached behaviour instance
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BehaviourId(u64);

impl BehaviourId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BehaviourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BehaviourId({})", self.0)
    }
}

impl fmt::Display for BehaviourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<Entity>,
    pub(crate) children: Vec<Entity>,
    pub(crate) transform: Transform,
    pub(crate) behaviours: Vec<(BehaviourId, Box<dyn Behaviour>)>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            behaviours: Vec::new(),
        }
    }
}

/// In-memory scene graph
#[derive(Default)]
pub struct Scene {
    allocator: EntityAllocator,
    nodes: Vec<Option<Node>>,
    next_behaviour: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a root entity
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.allocator.allocate();
        let slot = entity.index() as usize;
        if slot >= self.nodes.len() {
            self.nodes.resize_with(slot + 1, || None);
        }
        self.nodes[slot] = Some(Node::new(name.into()));
        log::trace!("Spawned {}", entity);
        entity
    }

    /// Check if an entity is alive
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of alive entities
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn node(&self, entity: Entity) -> Result<&Node, HandleError> {
        if entity.is_null() {
            return Err(HandleError::Null);
        }
        if !self.is_alive(entity) {
            return Err(HandleError::Stale);
        }
        self.nodes
            .get(entity.index() as usize)
            .and_then(Option::as_ref)
            .ok_or(HandleError::Stale)
    }

    pub(crate) fn node_mut(&mut self, entity: Entity) -> Result<&mut Node, HandleError> {
        if entity.is_null() {
            return Err(HandleError::Null);
        }
        if !self.is_alive(entity) {
            return Err(HandleError::Stale);
        }
        self.nodes
            .get_mut(entity.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(HandleError::Stale)
    }

    /// Remove a single entity's storage. Hierarchy links are handled by the
    /// caller.
    pub(crate) fn free(&mut self, entity: Entity) -> Option<Node> {
        if !self.allocator.deallocate(entity) {
            return None;
        }
        self.nodes.get_mut(entity.index() as usize).and_then(Option::take)
    }

    /// All alive entities without a parent, in slot order
    pub fn roots(&self) -> Vec<Entity> {
        self.entities()
            .filter(|&e| self.node(e).map_or(false, |n| n.parent.is_none()))
            .collect()
    }

    /// All alive entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_some())
            .filter_map(move |(slot, _)| self.allocator.handle_at(slot as u32))
    }

    /// Entity name
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.node(entity).ok().map(|n| n.name.as_str())
    }

    /// Find the first alive entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.entities().find(|&e| self.name(e) == Some(name))
    }

    // --- Transform ---

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.node(entity).ok().map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, entity: Entity) -> Option<&mut Transform> {
        self.node_mut(entity).ok().map(|n| &mut n.transform)
    }

    // --- Behaviours ---

    /// Attach a boxed behaviour at the end of the entity's list
    pub fn attach_boxed(
        &mut self,
        entity: Entity,
        behaviour: Box<dyn Behaviour>,
    ) -> Result<BehaviourId, HandleError> {
        let id = BehaviourId(self.next_behaviour);
        let node = self.node_mut(entity)?;
        log::trace!("Attached '{}' {} to {}", behaviour.type_tag(), id, entity);
        node.behaviours.push((id, behaviour));
        self.next_behaviour += 1;
        Ok(id)
    }

    /// Attach a typed behaviour
    pub fn add<T: Behaviour>(&mut self, entity: Entity, behaviour: T) -> Result<BehaviourId, HandleError> {
        self.attach_boxed(entity, Box::new(behaviour))
    }

    /// Detach a behaviour, returning it
    pub fn remove(&mut self, entity: Entity, id: BehaviourId) -> Result<Box<dyn Behaviour>, HandleError> {
        let node = self.node_mut(entity)?;
        let pos = node
            .behaviours
            .iter()
            .position(|(b, _)| *b == id)
            .ok_or(HandleError::MissingBehaviour)?;
        Ok(node.behaviours.remove(pos).1)
    }

    /// Ids of the entity's behaviours in attach order
    pub fn behaviour_ids(&self, entity: Entity) -> Vec<BehaviourId> {
        self.node(entity)
            .map(|n| n.behaviours.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    /// Behaviour by id
    pub fn behaviour(&self, entity: Entity, id: BehaviourId) -> Option<&dyn Behaviour> {
        self.node(entity)
            .ok()?
            .behaviours
            .iter()
            .find(|(b, _)| *b == id)
            .map(|(_, b)| b.as_ref())
    }

    /// Mutable behaviour by id
    pub fn behaviour_mut(&mut self, entity: Entity, id: BehaviourId) -> Option<&mut dyn Behaviour> {
        let node = self.node_mut(entity).ok()?;
        for (b, behaviour) in node.behaviours.iter_mut() {
            if *b == id {
                return Some(behaviour.as_mut());
            }
        }
        None
    }

    /// First behaviour of type `T`
    pub fn get<T: BehaviourType>(&self, entity: Entity) -> Option<&T> {
        self.node(entity)
            .ok()?
            .behaviours
            .iter()
            .find_map(|(_, b)| b.downcast_ref::<T>())
    }

    /// First behaviour of type `T`, mutably
    pub fn get_mut<T: BehaviourType>(&mut self, entity: Entity) -> Option<&mut T> {
        match self.node_mut(entity) {
            Ok(node) => node
                .behaviours
                .iter_mut()
                .find_map(|(_, b)| b.downcast_mut::<T>()),
            Err(_) => None,
        }
    }

    /// Every behaviour of type `T` in attach order
    pub fn get_all<T: BehaviourType>(&self, entity: Entity) -> Vec<&T> {
        match self.node(entity) {
            Ok(node) => node
                .behaviours
                .iter()
                .filter_map(|(_, b)| b.downcast_ref::<T>())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of behaviours attached to an entity
    pub fn behaviour_count(&self, entity: Entity) -> usize {
        self.node(entity).map_or(0, |n| n.behaviours.len())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.len())
            .field("next_behaviour", &self.next_behaviour)
            .finish()
    }
}
