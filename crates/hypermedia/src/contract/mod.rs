//! Contract model: the wire shape of one resource type.
//!
//! A [`Contract`] is produced by [`ContractBuilder::build`] and is read-only
//! from then on. Member access goes through closures captured at build time,
//! so the codec never looks anything up by reflection.

pub mod builder;
pub mod field;
pub mod relationship;

pub use builder::{ContractBuilder, RelationshipBuilder, TypeBuilder};
pub use field::{Field, FieldKind};
pub use relationship::{BelongsTo, HasMany, LinkTemplate, Relationship, RelationshipInfo};

use std::sync::Arc;

use crate::naming::FieldNaming;
use crate::resource::{ResourceRef, TypeHandle};

pub(crate) type Factory = Arc<dyn Fn() -> ResourceRef + Send + Sync>;

pub struct Contract {
    pub(crate) resource_type: String,
    pub(crate) type_handle: TypeHandle,
    pub(crate) id_field: Field,
    pub(crate) fields: Vec<Field>,
    pub(crate) relationships: Vec<Relationship>,
    pub(crate) link: Option<LinkTemplate>,
    pub(crate) factory: Factory,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("resource_type", &self.resource_type)
            .field("type", &self.type_handle.name())
            .field("id_field", &self.id_field)
            .field("fields", &self.fields)
            .field("relationships", &self.relationships)
            .field("link", &self.link)
            .finish()
    }
}

impl Contract {
    /// The wire type name, e.g. `posts`.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn type_handle(&self) -> TypeHandle {
        self.type_handle
    }

    pub fn id_field(&self) -> &Field {
        &self.id_field
    }

    /// Attributes, calculated values and members, in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Resource-level `self` link template.
    pub fn link(&self) -> Option<&LinkTemplate> {
        self.link.as_ref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        if self.id_field.name() == name {
            return Some(&self.id_field);
        }
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name() == name)
    }

    /// Finds the relationship a wire key (or include-path segment) refers to.
    pub fn relationship_by_wire(&self, wire: &str, naming: FieldNaming) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|r| naming.to_wire(r.name()) == wire)
            .or_else(|| self.relationships.iter().find(|r| naming.matches(wire, r.name())))
    }

    /// Finds the emitted field a wire attribute key refers to.
    pub fn attribute_by_wire(&self, wire: &str, naming: FieldNaming) -> Option<&Field> {
        let mut emitted = self.fields.iter().filter(|f| f.is_emitted());
        emitted
            .clone()
            .find(|f| naming.to_wire(f.name()) == wire)
            .or_else(|| emitted.find(|f| naming.matches(wire, f.name())))
    }

    /// Creates a fresh, default-initialized instance of the contract's type.
    pub fn instantiate(&self) -> ResourceRef {
        (self.factory)()
    }
}
