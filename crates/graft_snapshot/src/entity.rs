//! Entity snapshot record

use serde::{Deserialize, Serialize};

use crate::component::ComponentSnapshot;
use crate::transform::TransformSnapshot;

/// Transform plus the captured behaviours of one target entity, in
/// enumeration order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameObjectState {
    pub transform: TransformSnapshot,
    #[serde(default)]
    pub components: Vec<ComponentSnapshot>,
}

/// Name used by the coordinator API
pub type EntitySnapshot = GameObjectState;

impl GameObjectState {
    pub fn new(transform: TransformSnapshot) -> Self {
        Self {
            transform,
            components: Vec::new(),
        }
    }

    /// Builder: append a component snapshot
    pub fn with_component(mut self, component: ComponentSnapshot) -> Self {
        self.components.push(component);
        self
    }

    /// Component snapshots of one type, in order
    pub fn components_of<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ComponentSnapshot> + 'a {
        self.components.iter().filter(move |c| c.component_type == tag)
    }
}
