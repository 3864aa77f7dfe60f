use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::contract::{Contract, Relationship};
use crate::document::{Document, Linkage, PrimaryData, ResourceIdentifier, ResourceObject};
use crate::error::{DocumentError, Error, Result};
use crate::options::DeserializeOptions;
use crate::resolver::ContractResolver;
use crate::resource::{Linked, ResourceData, ResourceRef};
use crate::scalar::Scalar;

/// A resource built from a resource object, awaiting relationship wiring.
struct Pending<'d> {
    node: ResourceRef,
    contract: Arc<Contract>,
    object: &'d ResourceObject,
}

pub(super) struct Deserializer<'a> {
    resolver: &'a ContractResolver,
    options: &'a DeserializeOptions,
}

impl<'a> Deserializer<'a> {
    pub(super) fn new(resolver: &'a ContractResolver, options: &'a DeserializeOptions) -> Self {
        Self { resolver, options }
    }

    pub(super) fn run(&self, document: &Document) -> Result<ResourceData> {
        let data = document.data.as_ref().ok_or(DocumentError::MissingData)?;

        let mut pending = Vec::new();
        for object in data.resources() {
            let contract = self
                .resolver
                .try_resolve_by_resource_type(&object.resource_type)
                .ok_or_else(|| Error::UnknownResourceType(object.resource_type.clone()))?;
            pending.push(self.instantiate(contract, object)?);
        }
        let primary = pending.len();

        for object in &document.included {
            let Some(contract) = self.resolver.try_resolve_by_resource_type(&object.resource_type) else {
                tracing::warn!(
                    target: "hypermedia::codec",
                    resource_type = %object.resource_type,
                    "skipping included resource of unknown type"
                );
                continue;
            };
            pending.push(self.instantiate(contract, object)?);
        }

        // First occurrence of a `{type, id}` wins, so primary data shadows
        // an included copy of itself.
        let mut identity: HashMap<ResourceIdentifier, ResourceRef> = HashMap::new();
        for p in &pending {
            if let Some(key) = p.object.identifier() {
                identity.entry(key).or_insert_with(|| p.node.clone());
            }
        }

        for p in &pending {
            if !is_canonical(p, &identity) {
                tracing::debug!(
                    target: "hypermedia::codec",
                    resource_type = %p.object.resource_type,
                    id = p.object.id.as_deref().unwrap_or_default(),
                    "skipping duplicate resource object"
                );
                continue;
            }
            self.link(p, &identity)?;
        }

        let roots: Vec<ResourceRef> = pending[..primary]
            .iter()
            .map(|p| canonical(p, &identity).unwrap_or(&p.node).clone())
            .collect();

        Ok(match data {
            PrimaryData::Many(_) => ResourceData::Collection(roots),
            PrimaryData::Null | PrimaryData::Single(_) => ResourceData::Single(roots.into_iter().next()),
        })
    }

    /// Creates the node and assigns its id and attributes.
    fn instantiate<'d>(&self, contract: &Arc<Contract>, object: &'d ResourceObject) -> Result<Pending<'d>> {
        let node = contract.instantiate();
        {
            let mut value = node.borrow_mut();
            let any: &mut dyn Any = &mut *value;
            let id_field = contract.id_field();
            if let Some(id) = &object.id {
                Scalar::parse_id(id_field.scalar_kind(), id)
                    .and_then(|scalar| id_field.write(any, scalar))
                    .map_err(|e| Error::conversion(id_field.name(), e))?;
            }
            for (key, json) in &object.attributes {
                let Some(field) = contract.attribute_by_wire(key, self.options.naming) else {
                    tracing::debug!(
                        target: "hypermedia::codec",
                        resource_type = contract.resource_type(),
                        key = %key,
                        "ignoring unknown attribute"
                    );
                    continue;
                };
                if field.is_calculated() {
                    continue;
                }
                self.resolver
                    .converters()
                    .decode(field.scalar_kind(), field.converter(), json)
                    .and_then(|scalar| field.write(any, scalar))
                    .map_err(|e| Error::conversion(field.name(), e))?;
            }
        }
        Ok(Pending {
            node,
            contract: Arc::clone(contract),
            object,
        })
    }

    /// Wires every relationship member of one resource object.
    fn link(&self, p: &Pending<'_>, identity: &HashMap<ResourceIdentifier, ResourceRef>) -> Result<()> {
        for (key, member) in &p.object.relationships {
            let Some(rel) = p.contract.relationship_by_wire(key, self.options.naming) else {
                tracing::debug!(
                    target: "hypermedia::codec",
                    resource_type = p.contract.resource_type(),
                    key = %key,
                    "ignoring unknown relationship"
                );
                continue;
            };
            let Some(linkage) = &member.data else {
                continue;
            };
            match (rel, linkage) {
                (Relationship::BelongsTo(belongs_to), Linkage::Null) => {
                    let mut value = p.node.borrow_mut();
                    if let Some(backing) = &belongs_to.backing {
                        backing.clear(&mut *value);
                    }
                    (belongs_to.set)(&mut *value, None);
                }
                (Relationship::BelongsTo(belongs_to), Linkage::One(target_id)) => {
                    if let Some(backing) = &belongs_to.backing {
                        Scalar::parse_id(backing.scalar_kind(), &target_id.id)
                            .and_then(|scalar| backing.write(&mut *p.node.borrow_mut(), scalar))
                            .map_err(|e| Error::conversion(backing.name(), e))?;
                    }
                    let Some(target) = self.lookup(rel, target_id, identity) else {
                        continue;
                    };
                    let assigned = (belongs_to.set)(&mut *p.node.borrow_mut(), Some(target.clone()));
                    if assigned {
                        self.wire_inverse(rel, &p.node, &target);
                    } else {
                        mismatch(rel, &target);
                    }
                }
                (Relationship::HasMany(has_many), Linkage::Null) => {
                    (has_many.set)(&mut *p.node.borrow_mut(), None);
                }
                (Relationship::HasMany(has_many), Linkage::Many(ids)) => {
                    let items: Vec<ResourceRef> = ids
                        .iter()
                        .filter_map(|id| self.lookup(rel, id, identity))
                        .collect();
                    let complete = (has_many.set)(&mut *p.node.borrow_mut(), Some(items.clone()));
                    if !complete {
                        tracing::warn!(
                            target: "hypermedia::codec",
                            relationship = rel.name(),
                            "dropping linked resources of an unexpected type"
                        );
                    }
                    for item in &items {
                        self.wire_inverse(rel, &p.node, item);
                    }
                }
                (_, _) => {
                    return Err(DocumentError::CardinalityMismatch(format!(
                        "{}.relationships.{key}",
                        p.object.resource_type
                    ))
                    .into())
                }
            }
        }
        Ok(())
    }

    fn lookup(
        &self,
        rel: &Relationship,
        id: &ResourceIdentifier,
        identity: &HashMap<ResourceIdentifier, ResourceRef>,
    ) -> Option<ResourceRef> {
        let found = identity.get(id).cloned();
        if found.is_none() {
            tracing::debug!(
                target: "hypermedia::codec",
                relationship = rel.name(),
                resource_type = %id.resource_type,
                id = %id.id,
                "linked resource is not in the document; dropping linkage"
            );
        }
        found
    }

    /// Points the inverse relationship on `target` back at `owner`.
    fn wire_inverse(&self, rel: &Relationship, owner: &ResourceRef, target: &ResourceRef) {
        let Some(inverse_name) = rel.inverse() else {
            return;
        };
        let Some(inverse) = self
            .resolver
            .try_resolve(target.type_handle())
            .and_then(|contract| contract.relationship(inverse_name))
        else {
            return;
        };
        match inverse {
            Relationship::BelongsTo(belongs_to) => {
                if let Some(backing) = &belongs_to.backing {
                    let owner_id = self
                        .resolver
                        .try_resolve(owner.type_handle())
                        .and_then(|contract| contract.id_field().read(&*owner.borrow()).to_text());
                    let assigned = owner_id
                        .map(|id| Scalar::parse_id(backing.scalar_kind(), &id))
                        .map(|scalar| scalar.and_then(|s| backing.write(&mut *target.borrow_mut(), s)));
                    if let Some(Err(err)) = assigned {
                        tracing::warn!(
                            target: "hypermedia::codec",
                            relationship = inverse.name(),
                            error = %err,
                            "could not assign inverse backing field"
                        );
                    }
                }
                if !(belongs_to.set)(&mut *target.borrow_mut(), Some(owner.clone())) {
                    mismatch(inverse, owner);
                }
            }
            Relationship::HasMany(has_many) => {
                let current = (has_many.get)(&*target.borrow());
                let mut items = match current {
                    Linked::Value(items) => items,
                    Linked::Unloaded | Linked::Null => Vec::new(),
                };
                if items.iter().any(|item| item.ptr_eq(owner)) {
                    return;
                }
                items.push(owner.clone());
                if !(has_many.set)(&mut *target.borrow_mut(), Some(items)) {
                    mismatch(inverse, owner);
                }
            }
        }
    }
}

/// The node registered for this object's `{type, id}`, if it has one.
fn canonical<'n>(p: &Pending<'_>, identity: &'n HashMap<ResourceIdentifier, ResourceRef>) -> Option<&'n ResourceRef> {
    p.object.identifier().and_then(|key| identity.get(&key))
}

/// False for a later copy of a `{type, id}` already claimed by another node.
fn is_canonical(p: &Pending<'_>, identity: &HashMap<ResourceIdentifier, ResourceRef>) -> bool {
    canonical(p, identity).map_or(true, |node| node.ptr_eq(&p.node))
}

fn mismatch(rel: &Relationship, value: &ResourceRef) {
    tracing::warn!(
        target: "hypermedia::codec",
        relationship = rel.name(),
        type_name = value.type_handle().name(),
        "related resource has an unexpected type; leaving reference unset"
    );
}
