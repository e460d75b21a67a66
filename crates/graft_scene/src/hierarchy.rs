//! Hierarchy - Parent/child relationships between scene entities
//!
//! Operations validate their inputs and refuse to create cycles, so the
//! scene always stays a forest. Child order is insertion order and is the
//! order used by snapshot target lists and descendant walks.

use core::fmt;

use crate::entity::Entity;
use crate::scene::Scene;

/// Errors from hierarchy operations
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HierarchyError {
    /// Cycle detected in hierarchy
    CycleDetected {
        /// Entities involved in the cycle
        entities: Vec<Entity>,
    },
    /// Invalid parent reference
    InvalidParent { child: Entity, parent: Entity },
    /// Entity not found
    EntityNotFound { entity: Entity },
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected { entities } => {
                write!(f, "Cycle detected in hierarchy: {:?}", entities)
            }
            Self::InvalidParent { child, parent } => {
                write!(f, "Invalid parent {:?} for child {:?}", parent, child)
            }
            Self::EntityNotFound { entity } => write!(f, "Entity not found: {:?}", entity),
        }
    }
}

impl std::error::Error for HierarchyError {}

impl Scene {
    /// Spawn an entity as the last child of `parent`
    pub fn spawn_child(
        &mut self,
        parent: Entity,
        name: impl Into<String>,
    ) -> Result<Entity, HierarchyError> {
        if !self.is_alive(parent) {
            return Err(HierarchyError::EntityNotFound { entity: parent });
        }
        let child = self.spawn(name);
        self.set_parent(child, parent)?;
        Ok(child)
    }

    /// Make `child` the last child of `parent`, detaching it from any
    /// previous parent
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), HierarchyError> {
        if !self.is_alive(child) {
            return Err(HierarchyError::EntityNotFound { entity: child });
        }
        if !self.is_alive(parent) {
            return Err(HierarchyError::InvalidParent { child, parent });
        }

        if child == parent {
            return Err(HierarchyError::CycleDetected {
                entities: vec![child],
            });
        }

        // child cannot be an ancestor of parent
        if self.is_ancestor(parent, child) {
            return Err(HierarchyError::CycleDetected {
                entities: vec![child, parent],
            });
        }

        if self.parent(child) == Some(parent) {
            return Ok(());
        }
        self.remove_parent(child);

        if let Ok(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Ok(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach an entity from its parent, making it a root
    pub fn remove_parent(&mut self, entity: Entity) {
        let old_parent = match self.node_mut(entity) {
            Ok(node) => node.parent.take(),
            Err(_) => return,
        };
        if let Some(old) = old_parent {
            if let Ok(node) = self.node_mut(old) {
                node.children.retain(|&c| c != entity);
            }
        }
    }

    /// Parent of an entity
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.node(entity).ok()?.parent
    }

    /// Direct children in insertion order
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.node(entity).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Check whether `ancestor` appears on `entity`'s parent chain
    pub fn is_ancestor(&self, entity: Entity, ancestor: Entity) -> bool {
        let mut current = self.parent(entity);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Topmost ancestor (the entity itself if it is a root)
    pub fn root_of(&self, entity: Entity) -> Entity {
        let mut current = entity;
        while let Some(p) = self.parent(current) {
            current = p;
        }
        current
    }

    /// All descendants, depth-first pre-order, excluding `entity`
    pub fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut result = Vec::new();
        self.collect_descendants(entity, &mut result);
        result
    }

    fn collect_descendants(&self, entity: Entity, result: &mut Vec<Entity>) {
        for &child in self.children(entity) {
            result.push(child);
            self.collect_descendants(child, result);
        }
    }

    /// Despawn an entity together with its whole sub-tree
    pub fn despawn_recursive(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.remove_parent(entity);

        let mut doomed = self.descendants(entity);
        doomed.push(entity);
        for e in doomed {
            self.free(e);
        }
        true
    }
}
