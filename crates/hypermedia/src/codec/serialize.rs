use std::any::Any;
use std::collections::{HashSet, VecDeque};

use super::include::{IncludeTree, NodeId};
use crate::contract::{Contract, Relationship};
use crate::document::{Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject};
use crate::error::{Error, Result};
use crate::options::SerializeOptions;
use crate::resolver::ContractResolver;
use crate::resource::{Linked, ResourceData, ResourceRef};

pub(super) struct Serializer<'a> {
    resolver: &'a ContractResolver,
    options: &'a SerializeOptions,
}

impl<'a> Serializer<'a> {
    pub(super) fn new(resolver: &'a ContractResolver, options: &'a SerializeOptions) -> Self {
        Self { resolver, options }
    }

    pub(super) fn run(&self, data: &ResourceData) -> Result<Document> {
        let mut emitted: HashSet<ResourceIdentifier> = HashSet::new();
        let mut primary = Vec::with_capacity(data.roots().len());
        for root in data.roots() {
            let contract = self.resolver.resolve(root)?;
            let object = self.write_resource(contract, root)?;
            if let Some(key) = object.identifier() {
                emitted.insert(key);
            }
            primary.push(object);
        }
        let included = self.collect_included(data.roots(), &mut emitted)?;
        let data = match data {
            ResourceData::Collection(_) => PrimaryData::Many(primary),
            ResourceData::Single(_) => match primary.pop() {
                Some(object) => PrimaryData::Single(object),
                None => PrimaryData::Null,
            },
        };
        Ok(Document {
            data: Some(data),
            included,
            ..Document::default()
        })
    }

    /// Breadth-first walk along the include tree.
    ///
    /// A `{type, id}` is emitted at most once, and expanded at most once per
    /// include-tree node, which bounds the walk even on cyclic graphs.
    fn collect_included(
        &self,
        roots: &[ResourceRef],
        emitted: &mut HashSet<ResourceIdentifier>,
    ) -> Result<Vec<ResourceObject>> {
        let tree = IncludeTree::from_paths(&self.options.include);
        let mut included = Vec::new();
        if tree.is_empty() {
            return Ok(included);
        }
        let mut expanded: HashSet<(ResourceIdentifier, NodeId)> = HashSet::new();
        let mut queue: VecDeque<(ResourceRef, NodeId)> =
            roots.iter().map(|root| (root.clone(), IncludeTree::ROOT)).collect();

        while let Some((resource, node)) = queue.pop_front() {
            let Some(contract) = self.resolver.try_resolve(resource.type_handle()) else {
                continue;
            };
            for (segment, child) in tree.children(node) {
                let Some(rel) = contract.relationship_by_wire(segment, self.options.naming) else {
                    tracing::debug!(
                        target: "hypermedia::codec",
                        resource_type = contract.resource_type(),
                        path = segment,
                        "include path names no relationship"
                    );
                    continue;
                };
                for related in related_resources(rel, &resource) {
                    let Some(related_contract) = self.resolver.try_resolve(related.type_handle()) else {
                        tracing::warn!(
                            target: "hypermedia::codec",
                            relationship = rel.name(),
                            type_name = related.type_handle().name(),
                            "skipping included resource without a contract"
                        );
                        continue;
                    };
                    let Some(key) = identifier(related_contract, &related) else {
                        tracing::debug!(
                            target: "hypermedia::codec",
                            resource_type = related_contract.resource_type(),
                            "skipping included resource without an id"
                        );
                        continue;
                    };
                    if emitted.insert(key.clone()) {
                        included.push(self.write_resource(related_contract, &related)?);
                    }
                    if expanded.insert((key, child)) {
                        queue.push_back((related, child));
                    }
                }
            }
        }
        Ok(included)
    }

    fn write_resource(&self, contract: &Contract, resource: &ResourceRef) -> Result<ResourceObject> {
        let value = resource.borrow();
        let any: &dyn Any = &*value;
        let naming = self.options.naming;
        let resource_type = contract.resource_type();

        let mut object = ResourceObject::new(resource_type, contract.id_field().read(any).to_text());
        for field in contract.fields().iter().filter(|f| f.is_emitted()) {
            if !self.options.keeps(resource_type, field.name()) {
                continue;
            }
            let json = self
                .resolver
                .converters()
                .encode(field.scalar_kind(), field.converter(), &field.read(any))
                .map_err(|e| Error::conversion(field.name(), e))?;
            object.attributes.insert(naming.to_wire(field.name()), json);
        }
        for rel in contract.relationships() {
            if !rel.applies_to(any) || !self.options.keeps(resource_type, rel.name()) {
                continue;
            }
            if let Some(relationship) = self.write_relationship(rel, any) {
                object.relationships.insert(naming.to_wire(rel.name()), relationship);
            }
        }
        if self.options.resource_links {
            if let Some(template) = contract.link() {
                match template.render(any) {
                    Some(href) => {
                        object.links.insert("self".to_owned(), href);
                    }
                    None => tracing::debug!(
                        target: "hypermedia::codec",
                        resource_type,
                        template = template.template(),
                        "omitting self link"
                    ),
                }
            }
        }
        Ok(object)
    }

    /// `None` when the relationship is not loaded and must be left out.
    fn write_relationship(&self, rel: &Relationship, resource: &dyn Any) -> Option<RelationshipObject> {
        let data = match rel {
            Relationship::BelongsTo(belongs_to) => match &belongs_to.backing {
                Some(backing) => match backing.read(resource).to_text() {
                    None => Linkage::Null,
                    Some(id) => {
                        let handle = rel.related_type(resource);
                        let Some(related) = self.resolver.try_resolve(handle) else {
                            tracing::warn!(
                                target: "hypermedia::codec",
                                relationship = rel.name(),
                                type_name = handle.name(),
                                "omitting relationship whose related type has no contract"
                            );
                            return None;
                        };
                        Linkage::One(ResourceIdentifier::new(related.resource_type(), id))
                    }
                },
                None => match (belongs_to.get)(resource) {
                    Linked::Unloaded => return None,
                    Linked::Null => Linkage::Null,
                    Linked::Value(related) => Linkage::One(self.linkage(rel, &related)?),
                },
            },
            Relationship::HasMany(has_many) => match (has_many.get)(resource) {
                Linked::Unloaded => return None,
                Linked::Null => Linkage::Null,
                Linked::Value(items) => {
                    Linkage::Many(items.iter().filter_map(|item| self.linkage(rel, item)).collect())
                }
            },
        };
        let mut object = RelationshipObject {
            data: Some(data),
            ..RelationshipObject::default()
        };
        if let Some(template) = rel.link() {
            match template.render(resource) {
                Some(href) => {
                    object.links.insert("related".to_owned(), href);
                }
                None => tracing::debug!(
                    target: "hypermedia::codec",
                    relationship = rel.name(),
                    template = template.template(),
                    "omitting related link"
                ),
            }
        }
        Some(object)
    }

    fn linkage(&self, rel: &Relationship, related: &ResourceRef) -> Option<ResourceIdentifier> {
        let handle = related.type_handle();
        let identified = self
            .resolver
            .try_resolve(handle)
            .and_then(|contract| identifier(contract, related));
        if identified.is_none() {
            tracing::warn!(
                target: "hypermedia::codec",
                relationship = rel.name(),
                type_name = handle.name(),
                "dropping linkage to a resource without a contract or id"
            );
        }
        identified
    }
}

fn identifier(contract: &Contract, resource: &ResourceRef) -> Option<ResourceIdentifier> {
    let id = contract.id_field().read(&*resource.borrow()).to_text()?;
    Some(ResourceIdentifier::new(contract.resource_type(), id))
}

/// The loaded related resources of `rel` on `resource`; empty when the
/// relationship is unloaded, null or switched off by its condition.
fn related_resources(rel: &Relationship, resource: &ResourceRef) -> Vec<ResourceRef> {
    let value = resource.borrow();
    let any: &dyn Any = &*value;
    if !rel.applies_to(any) {
        return Vec::new();
    }
    match rel {
        Relationship::BelongsTo(belongs_to) => match (belongs_to.get)(any) {
            Linked::Value(related) => vec![related],
            Linked::Unloaded | Linked::Null => Vec::new(),
        },
        Relationship::HasMany(has_many) => match (has_many.get)(any) {
            Linked::Value(items) => items,
            Linked::Unloaded | Linked::Null => Vec::new(),
        },
    }
}
