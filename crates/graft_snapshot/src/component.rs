//! Component snapshot
//!
//! A filtered capture of one behaviour: its type tag, its data fields as
//! dynamic values, and its reference fields as identity tags of the entities
//! they pointed at.
//!
//! Fields are kept as name/value pairs in schema declaration order, and
//! populate writes them back in that order.

use graft_core::{IdentityTag, TypeSchema, TypeTag};
use graft_scene::{Behaviour, Entity, SceneHost, Value};
use serde::{Deserialize, Serialize};

/// Persisted state of one behaviour instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    #[serde(rename = "Type")]
    pub component_type: TypeTag,
    #[serde(rename = "Fields", default)]
    pub fields: Vec<(String, Value)>,
    #[serde(rename = "References", default)]
    pub references: Vec<(String, Option<IdentityTag>)>,
}

impl ComponentSnapshot {
    /// Empty snapshot of a type
    pub fn new(component_type: impl Into<TypeTag>) -> Self {
        Self {
            component_type: component_type.into(),
            fields: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Builder: set a data field, replacing an earlier value of the same name
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        upsert(&mut self.fields, name.into(), value.into());
        self
    }

    /// Builder: set a reference field, replacing an earlier target of the
    /// same name
    pub fn with_reference(mut self, name: impl Into<String>, target: Option<IdentityTag>) -> Self {
        upsert(&mut self.references, name.into(), target);
        self
    }

    /// Value of a data field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Recorded target of a reference field
    pub fn reference(&self, name: &str) -> Option<Option<IdentityTag>> {
        self.references.iter().find(|(n, _)| n == name).map(|(_, t)| *t)
    }

    /// Read every schema field of a live behaviour.
    ///
    /// Reference targets are translated to their identity tags; a target
    /// that is dead or carries no identity is stored as `None`.
    pub fn capture<H: SceneHost>(host: &H, behaviour: &dyn Behaviour, schema: &TypeSchema) -> Self {
        let mut snapshot = Self::new(behaviour.type_tag());

        for name in schema.data_fields() {
            match behaviour.read_field(name) {
                Some(value) => snapshot.fields.push((name.to_string(), value)),
                None => log::warn!(
                    "'{}' declares data field '{}' but does not expose it",
                    snapshot.component_type,
                    name
                ),
            }
        }

        for name in schema.reference_fields() {
            let target = behaviour.read_reference(name).flatten();
            snapshot
                .references
                .push((name.to_string(), target.and_then(|e| identity_of_live(host, e))));
        }

        snapshot
    }

    /// Write the data fields into a live behaviour. Reference fields are left
    /// for linking. Returns the number of fields that could not be written.
    pub fn populate(&self, behaviour: &mut dyn Behaviour) -> usize {
        let mut skipped = 0;
        for (name, value) in &self.fields {
            if let Err(e) = behaviour.write_field(name, value) {
                log::warn!("Skipping field while injecting: {}", e);
                skipped += 1;
            }
        }
        skipped
    }

    /// Number of data and reference fields
    pub fn field_count(&self) -> usize {
        self.fields.len() + self.references.len()
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name, value)),
    }
}

fn identity_of_live<H: SceneHost>(host: &H, entity: Entity) -> Option<IdentityTag> {
    if !host.contains(entity) {
        return None;
    }
    host.identity_of(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_scene::{impl_behaviour, BehaviourType, Scene, SerialisableIdentity};

    #[derive(Debug, Default)]
    struct Switch {
        on: bool,
        label: String,
        target: Option<Entity>,
    }

    impl_behaviour!(Switch => "switch" {
        data: [on, label],
        references: [target],
    });

    #[test]
    fn test_capture_translates_references() {
        let mut scene = Scene::new();
        let lamp = scene.spawn("lamp");
        let tag = IdentityTag::from_u128(9);
        scene.add(lamp, SerialisableIdentity::new(tag)).unwrap();

        let switch = Switch {
            on: true,
            label: "hall".into(),
            target: Some(lamp),
        };
        let snap = ComponentSnapshot::capture(&scene, &switch, &Switch::schema());

        assert_eq!(snap.component_type, "switch");
        assert_eq!(snap.field("on"), Some(&Value::Bool(true)));
        assert_eq!(snap.field("label"), Some(&Value::String("hall".into())));
        assert_eq!(snap.reference("target"), Some(Some(tag)));
    }

    #[test]
    fn test_capture_unaddressable_reference_is_none() {
        let mut scene = Scene::new();
        let plain = scene.spawn("plain");
        let dead = scene.spawn("dead");
        scene.add(dead, SerialisableIdentity::default()).unwrap();
        scene.despawn_recursive(dead);

        for target in [None, Some(plain), Some(dead)] {
            let switch = Switch {
                target,
                ..Switch::default()
            };
            let snap = ComponentSnapshot::capture(&scene, &switch, &Switch::schema());
            assert_eq!(snap.reference("target"), Some(None));
        }
    }

    #[test]
    fn test_populate_skips_bad_fields() {
        let snap = ComponentSnapshot::new("switch")
            .with_field("on", true)
            .with_field("label", 5)
            .with_field("missing", 1.0)
            .with_reference("target", Some(IdentityTag::from_u128(1)));

        let mut switch = Switch::default();
        let skipped = snap.populate(&mut switch);

        assert_eq!(skipped, 2);
        assert!(switch.on);
        assert!(switch.label.is_empty());
        assert!(switch.target.is_none());
        assert_eq!(snap.field_count(), 4);
    }

    #[test]
    fn test_fields_follow_schema_order() {
        let scene = Scene::new();
        let snap = ComponentSnapshot::capture(&scene, &Switch::default(), &Switch::schema());
        let names: Vec<_> = snap.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["on", "label"]);

        let snap = ComponentSnapshot::new("switch")
            .with_field("label", "a")
            .with_field("on", true)
            .with_field("label", "b");
        let names: Vec<_> = snap.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["label", "on"]);
        assert_eq!(snap.field("label"), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_populate_writes_in_stored_order() {
        #[derive(Debug, Default)]
        struct Journal {
            first: String,
            second: String,
        }

        impl_behaviour!(Journal => "journal" {
            data: [first, second],
            references: [],
        });

        // Written in stored order, so a repeated name ends with its last value
        let mut snap = ComponentSnapshot::new("journal")
            .with_field("second", "b")
            .with_field("first", "a");
        snap.fields.push(("first".to_string(), Value::from("c")));

        let mut journal = Journal::default();
        assert_eq!(snap.populate(&mut journal), 0);
        assert_eq!(journal.first, "c");
        assert_eq!(journal.second, "b");
    }
}
