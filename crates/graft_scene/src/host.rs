//! SceneHost - The scene operations the snapshot pipeline relies on
//!
//! Anything that can enumerate children, read and write a local transform,
//! and attach, detach and address behaviours can host snapshot
//! coordinators. [`Scene`] is the in-memory implementation.

use graft_core::{HandleError, IdentityTag};
use graft_math::Transform;

use crate::behaviour::{Behaviour, BehaviourType};
use crate::entity::Entity;
use crate::identity::SerialisableIdentity;
use crate::scene::{BehaviourId, Scene};

/// Scene framework seam
pub trait SceneHost {
    /// Check if an entity is alive
    fn contains(&self, entity: Entity) -> bool;

    /// Transform relative to the parent
    fn local_transform(&self, entity: Entity) -> Result<Transform, HandleError>;

    fn set_local_transform(&mut self, entity: Entity, transform: Transform) -> Result<(), HandleError>;

    /// Attached behaviours in enumeration order
    fn behaviour_ids(&self, entity: Entity) -> Vec<BehaviourId>;

    fn behaviour(&self, entity: Entity, id: BehaviourId) -> Option<&dyn Behaviour>;

    fn behaviour_mut(&mut self, entity: Entity, id: BehaviourId) -> Option<&mut dyn Behaviour>;

    /// Attach at the end of the entity's behaviour list
    fn attach(&mut self, entity: Entity, behaviour: Box<dyn Behaviour>) -> Result<BehaviourId, HandleError>;

    fn detach(&mut self, entity: Entity, id: BehaviourId) -> Result<Box<dyn Behaviour>, HandleError>;

    /// Direct children in order
    fn children(&self, entity: Entity) -> Vec<Entity>;

    /// First behaviour carrying `tag`
    fn find_behaviour(&self, entity: Entity, tag: &str) -> Option<BehaviourId> {
        self.behaviour_ids(entity)
            .into_iter()
            .find(|&id| self.behaviour(entity, id).map_or(false, |b| b.type_tag() == tag))
    }

    /// All descendants, depth-first pre-order
    fn descendants(&self, entity: Entity) -> Vec<Entity> {
        let mut result = Vec::new();
        let mut stack: Vec<Entity> = self.children(entity).into_iter().rev().collect();
        while let Some(e) = stack.pop() {
            result.push(e);
            stack.extend(self.children(e).into_iter().rev());
        }
        result
    }

    /// Identity tag carried by the entity, if any
    fn identity_of(&self, entity: Entity) -> Option<IdentityTag> {
        let id = self.find_behaviour(entity, SerialisableIdentity::TAG)?;
        self.behaviour(entity, id)?
            .downcast_ref::<SerialisableIdentity>()
            .map(|identity| identity.tag)
    }

    /// Existing behaviour of type `T`, or a freshly attached default one
    fn get_or_attach<T: BehaviourType>(&mut self, entity: Entity) -> Result<BehaviourId, HandleError> {
        if !self.contains(entity) {
            return Err(HandleError::Stale);
        }
        match self.find_behaviour(entity, T::TAG) {
            Some(id) => Ok(id),
            None => self.attach(entity, Box::new(T::default())),
        }
    }
}

impl SceneHost for Scene {
    fn contains(&self, entity: Entity) -> bool {
        self.is_alive(entity)
    }

    fn local_transform(&self, entity: Entity) -> Result<Transform, HandleError> {
        self.node(entity).map(|n| n.transform)
    }

    fn set_local_transform(&mut self, entity: Entity, transform: Transform) -> Result<(), HandleError> {
        self.node_mut(entity)?.transform = transform;
        Ok(())
    }

    fn behaviour_ids(&self, entity: Entity) -> Vec<BehaviourId> {
        Scene::behaviour_ids(self, entity)
    }

    fn behaviour(&self, entity: Entity, id: BehaviourId) -> Option<&dyn Behaviour> {
        Scene::behaviour(self, entity, id)
    }

    fn behaviour_mut(&mut self, entity: Entity, id: BehaviourId) -> Option<&mut dyn Behaviour> {
        Scene::behaviour_mut(self, entity, id)
    }

    fn attach(&mut self, entity: Entity, behaviour: Box<dyn Behaviour>) -> Result<BehaviourId, HandleError> {
        self.attach_boxed(entity, behaviour)
    }

    fn detach(&mut self, entity: Entity, id: BehaviourId) -> Result<Box<dyn Behaviour>, HandleError> {
        self.remove(entity, id)
    }

    fn children(&self, entity: Entity) -> Vec<Entity> {
        Scene::children(self, entity).to_vec()
    }

    fn descendants(&self, entity: Entity) -> Vec<Entity> {
        Scene::descendants(self, entity)
    }
}
