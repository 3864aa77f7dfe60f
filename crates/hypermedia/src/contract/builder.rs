//! ContractBuilder — fluent, single-use construction of a [`ContractResolver`].
//!
//! ```
//! use hypermedia::{ContractBuilder, Shared};
//!
//! #[derive(Default)]
//! struct User { id: i32, name: String }
//!
//! #[derive(Default)]
//! struct Post { id: i32, title: String, owner_id: Option<i32>, owner: Option<Shared<User>> }
//!
//! let mut builder = ContractBuilder::new();
//! builder
//!     .with::<User>("users")
//!     .id("Id", |u| u.id, |u, v| u.id = v)
//!     .attribute("DisplayName", |u| u.name.clone(), |u, v| u.name = v);
//! let mut posts = builder.with::<Post>("posts");
//! posts
//!     .id("Id", |p| p.id, |p, v| p.id = v)
//!     .attribute("Title", |p| p.title.clone(), |p, v| p.title = v)
//!     .member("OwnerUserId", |p| p.owner_id, |p, v| p.owner_id = v);
//! posts
//!     .belongs_to("OwnerUser", |p| p.owner.clone(), |p, v| p.owner = v)
//!     .backing_field("OwnerUserId")
//!     .template("/v1/users/{id}", "id", |p| p.owner_id);
//!
//! let resolver = builder.build().unwrap();
//! assert!(resolver.try_resolve_by_resource_type("posts").is_some());
//! assert!(builder.build().is_err());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::field::{erase_get, Field, FieldKind};
use super::relationship::{BelongsTo, HasMany, LinkTemplate, Relationship, RelationshipInfo};
use super::{Contract, Factory};
use crate::converter::{ConverterRegistry, ValueConverter};
use crate::error::{ContractValidationError, Error, Result};
use crate::resolver::ContractResolver;
use crate::resource::{Linked, ResourceRef, Shared, TypeHandle};
use crate::scalar::{ScalarKind, ScalarType};

struct ContractDraft {
    resource_type: String,
    type_handle: TypeHandle,
    id_field: Option<Field>,
    fields: Vec<Field>,
    relationships: Vec<Relationship>,
    link: Option<LinkTemplate>,
    factory: Factory,
}

/// Collects type declarations and validates them into a resolver.
pub struct ContractBuilder {
    drafts: Vec<ContractDraft>,
    converters: ConverterRegistry,
    built: bool,
}

impl Default for ContractBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractBuilder {
    pub fn new() -> Self {
        Self {
            drafts: Vec::new(),
            converters: ConverterRegistry::new(),
            built: false,
        }
    }

    /// Replaces the default converter for every field of `kind` that does not
    /// declare its own.
    pub fn converter(&mut self, kind: ScalarKind, converter: Arc<dyn ValueConverter>) -> &mut Self {
        self.converters.register(kind, converter);
        self
    }

    /// Starts declaring `T` under the wire type name `resource_type`.
    pub fn with<T: Default + 'static>(&mut self, resource_type: impl Into<String>) -> TypeBuilder<'_, T> {
        let index = self.drafts.len();
        self.drafts.push(ContractDraft {
            resource_type: resource_type.into(),
            type_handle: TypeHandle::of::<T>(),
            id_field: None,
            fields: Vec::new(),
            relationships: Vec::new(),
            link: None,
            factory: Arc::new(|| ResourceRef::from_value(T::default())),
        });
        TypeBuilder {
            draft: &mut self.drafts[index],
            _type: PhantomData,
        }
    }

    /// Validates every pending declaration and freezes them into a resolver.
    ///
    /// The builder is single-use: any later call fails with
    /// [`Error::InvalidOperation`].
    pub fn build(&mut self) -> Result<ContractResolver> {
        if self.built {
            return Err(Error::InvalidOperation("ContractBuilder::build may only be called once"));
        }
        self.built = true;
        let drafts = std::mem::take(&mut self.drafts);

        let mut by_handle: HashMap<TypeHandle, usize> = HashMap::new();
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (index, draft) in drafts.iter().enumerate() {
            if by_handle.insert(draft.type_handle, index).is_some() {
                return Err(ContractValidationError::DuplicateType {
                    type_name: draft.type_handle.name(),
                }
                .into());
            }
            if let Some(&other) = by_name.get(draft.resource_type.as_str()) {
                return Err(ContractValidationError::DuplicateResourceType {
                    resource_type: draft.resource_type.clone(),
                    first: drafts[other].type_handle.name(),
                    second: draft.type_handle.name(),
                }
                .into());
            }
            by_name.insert(&draft.resource_type, index);
            validate_members(draft)?;
        }
        for draft in &drafts {
            validate_inverses(draft, &drafts, &by_handle)?;
        }

        let mut contracts = Vec::with_capacity(drafts.len());
        for draft in drafts {
            contracts.push(finish(draft)?);
        }
        Ok(ContractResolver::new(
            contracts,
            Arc::new(std::mem::take(&mut self.converters)),
        ))
    }
}

fn validate_members(draft: &ContractDraft) -> Result<(), ContractValidationError> {
    let Some(id_field) = &draft.id_field else {
        return Err(ContractValidationError::MissingId {
            resource_type: draft.resource_type.clone(),
        });
    };
    let mut seen: Vec<&str> = vec![id_field.name()];
    let names = draft
        .fields
        .iter()
        .map(Field::name)
        .chain(draft.relationships.iter().map(Relationship::name));
    for name in names {
        if seen.contains(&name) {
            return Err(ContractValidationError::DuplicateMember {
                resource_type: draft.resource_type.clone(),
                member: name.to_owned(),
            });
        }
        seen.push(name);
    }
    Ok(())
}

fn validate_inverses(
    draft: &ContractDraft,
    drafts: &[ContractDraft],
    by_handle: &HashMap<TypeHandle, usize>,
) -> Result<(), ContractValidationError> {
    for rel in &draft.relationships {
        let Some(inverse) = rel.inverse() else {
            continue;
        };
        let related = rel.declared_related_type();
        let Some(&index) = by_handle.get(&related) else {
            return Err(ContractValidationError::UnknownRelatedType {
                resource_type: draft.resource_type.clone(),
                relationship: rel.name().to_owned(),
                type_name: related.name(),
            });
        };
        let target = &drafts[index];
        if !target.relationships.iter().any(|r| r.name() == inverse) {
            return Err(ContractValidationError::MissingInverse {
                resource_type: draft.resource_type.clone(),
                relationship: rel.name().to_owned(),
                related_type: target.resource_type.clone(),
                inverse: inverse.to_owned(),
            });
        }
    }
    Ok(())
}

/// Resolves backing fields and produces the immutable contract.
fn finish(draft: ContractDraft) -> Result<Contract, ContractValidationError> {
    let ContractDraft {
        resource_type,
        type_handle,
        id_field,
        fields,
        mut relationships,
        link,
        factory,
    } = draft;
    let Some(id_field) = id_field else {
        return Err(ContractValidationError::MissingId { resource_type });
    };
    for rel in &mut relationships {
        let Relationship::BelongsTo(belongs_to) = rel else {
            continue;
        };
        let Some(name) = &belongs_to.backing_field else {
            continue;
        };
        let backing = std::iter::once(&id_field)
            .chain(fields.iter())
            .find(|f| f.name() == name && !f.is_calculated());
        match backing {
            Some(field) => belongs_to.backing = Some(field.clone()),
            None => {
                return Err(ContractValidationError::MissingBackingField {
                    resource_type,
                    relationship: belongs_to.info.name.clone(),
                    field: name.clone(),
                })
            }
        }
    }
    Ok(Contract {
        resource_type,
        type_handle,
        id_field,
        fields,
        relationships,
        link,
        factory,
    })
}

/// Declares the members of one resource type.
pub struct TypeBuilder<'a, T> {
    draft: &'a mut ContractDraft,
    _type: PhantomData<fn(&T)>,
}

impl<'a, T: 'static> TypeBuilder<'a, T> {
    pub fn id<V, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> &mut Self
    where
        V: ScalarType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.draft.id_field = Some(Field::accessor(name.into(), FieldKind::Id, get, set));
        self
    }

    pub fn attribute<V, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> &mut Self
    where
        V: ScalarType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.draft
            .fields
            .push(Field::accessor(name.into(), FieldKind::Attribute, get, set));
        self
    }

    /// Declares an attribute with its own converter instead of the
    /// registry's default for its kind.
    pub fn attribute_with<V, G, S>(
        &mut self,
        name: impl Into<String>,
        converter: Arc<dyn ValueConverter>,
        get: G,
        set: S,
    ) -> &mut Self
    where
        V: ScalarType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let field = Field::accessor(name.into(), FieldKind::Attribute, get, set).with_converter(converter);
        self.draft.fields.push(field);
        self
    }

    /// Declares a scalar that is never emitted as an attribute, typically a
    /// foreign key named by [`RelationshipBuilder::backing_field`].
    pub fn member<V, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> &mut Self
    where
        V: ScalarType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.draft
            .fields
            .push(Field::accessor(name.into(), FieldKind::Member, get, set));
        self
    }

    /// Declares a read-only attribute computed from the resource at
    /// serialize time.
    pub fn calculated<V, F>(&mut self, name: impl Into<String>, calc: F) -> &mut Self
    where
        V: ScalarType,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.draft.fields.push(Field::calculated(name.into(), calc));
        self
    }

    /// Declares the resource-level `self` link.
    pub fn link<V, F>(&mut self, template: impl Into<String>, param: impl Into<String>, extract: F) -> &mut Self
    where
        V: ScalarType,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.draft.link = Some(LinkTemplate::new(template.into(), param.into(), erase_get(extract)));
        self
    }

    pub fn belongs_to<U, R, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> RelationshipBuilder<'_, T>
    where
        U: 'static,
        R: Into<Linked<Shared<U>>>,
        G: Fn(&T) -> R + Send + Sync + 'static,
        S: Fn(&mut T, Option<Shared<U>>) + Send + Sync + 'static,
    {
        let relationship = Relationship::BelongsTo(BelongsTo {
            info: RelationshipInfo::new(name.into(), TypeHandle::of::<U>()),
            backing_field: None,
            backing: None,
            get: Arc::new(move |any: &dyn Any| match any.downcast_ref::<T>() {
                Some(target) => Into::<Linked<Shared<U>>>::into(get(target)).map(ResourceRef::from),
                None => Linked::Unloaded,
            }),
            set: Arc::new(move |any: &mut dyn Any, value: Option<ResourceRef>| {
                let Some(target) = any.downcast_mut::<T>() else {
                    return false;
                };
                match value {
                    None => {
                        set(target, None);
                        true
                    }
                    Some(related) => match related.downcast::<U>() {
                        Some(typed) => {
                            set(target, Some(typed));
                            true
                        }
                        None => false,
                    },
                }
            }),
        });
        self.push_relationship(relationship)
    }

    /// Like [`TypeBuilder::belongs_to`], emitted only for resources where
    /// `condition` holds.
    pub fn belongs_to_if<U, R, G, S, C>(
        &mut self,
        name: impl Into<String>,
        get: G,
        set: S,
        condition: C,
    ) -> RelationshipBuilder<'_, T>
    where
        U: 'static,
        R: Into<Linked<Shared<U>>>,
        G: Fn(&T) -> R + Send + Sync + 'static,
        S: Fn(&mut T, Option<Shared<U>>) + Send + Sync + 'static,
        C: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let mut builder = self.belongs_to(name, get, set);
        builder.condition(condition);
        builder
    }

    pub fn has_many<U, R, G, S>(&mut self, name: impl Into<String>, get: G, set: S) -> RelationshipBuilder<'_, T>
    where
        U: 'static,
        R: Into<Linked<Vec<Shared<U>>>>,
        G: Fn(&T) -> R + Send + Sync + 'static,
        S: Fn(&mut T, Option<Vec<Shared<U>>>) + Send + Sync + 'static,
    {
        let relationship = Relationship::HasMany(HasMany {
            info: RelationshipInfo::new(name.into(), TypeHandle::of::<U>()),
            get: Arc::new(move |any: &dyn Any| match any.downcast_ref::<T>() {
                Some(target) => Into::<Linked<Vec<Shared<U>>>>::into(get(target))
                    .map(|items| items.into_iter().map(ResourceRef::from).collect()),
                None => Linked::Unloaded,
            }),
            set: Arc::new(move |any: &mut dyn Any, value: Option<Vec<ResourceRef>>| {
                let Some(target) = any.downcast_mut::<T>() else {
                    return false;
                };
                let Some(items) = value else {
                    set(target, None);
                    return true;
                };
                let total = items.len();
                let typed: Vec<Shared<U>> = items.iter().filter_map(ResourceRef::downcast).collect();
                let complete = typed.len() == total;
                set(target, Some(typed));
                complete
            }),
        });
        self.push_relationship(relationship)
    }

    /// Like [`TypeBuilder::has_many`], emitted only for resources where
    /// `condition` holds.
    pub fn has_many_if<U, R, G, S, C>(
        &mut self,
        name: impl Into<String>,
        get: G,
        set: S,
        condition: C,
    ) -> RelationshipBuilder<'_, T>
    where
        U: 'static,
        R: Into<Linked<Vec<Shared<U>>>>,
        G: Fn(&T) -> R + Send + Sync + 'static,
        S: Fn(&mut T, Option<Vec<Shared<U>>>) + Send + Sync + 'static,
        C: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let mut builder = self.has_many(name, get, set);
        builder.condition(condition);
        builder
    }

    fn push_relationship(&mut self, relationship: Relationship) -> RelationshipBuilder<'_, T> {
        let index = self.draft.relationships.len();
        self.draft.relationships.push(relationship);
        RelationshipBuilder {
            relationship: &mut self.draft.relationships[index],
            _type: PhantomData,
        }
    }
}

/// Refines a relationship declared through [`TypeBuilder`].
pub struct RelationshipBuilder<'a, T> {
    relationship: &'a mut Relationship,
    _type: PhantomData<fn(&T)>,
}

impl<'a, T: 'static> RelationshipBuilder<'a, T> {
    /// Names the scalar member holding the related id. Only meaningful for
    /// belongs-to relationships; ignored on has-many.
    pub fn backing_field(&mut self, name: impl Into<String>) -> &mut Self {
        if let Relationship::BelongsTo(rel) = self.relationship {
            rel.backing_field = Some(name.into());
        }
        self
    }

    /// Names the relationship on the related type that points back here.
    pub fn inverse(&mut self, name: impl Into<String>) -> &mut Self {
        self.relationship.info_mut().inverse = Some(name.into());
        self
    }

    /// Sets the `related` link template.
    pub fn template<V, F>(&mut self, template: impl Into<String>, param: impl Into<String>, extract: F) -> &mut Self
    where
        V: ScalarType,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.relationship.info_mut().link =
            Some(LinkTemplate::new(template.into(), param.into(), erase_get(extract)));
        self
    }

    /// Emits the relationship only for resources where `condition` holds.
    pub fn condition<C>(&mut self, condition: C) -> &mut Self
    where
        C: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.relationship.info_mut().condition = Some(Arc::new(move |any: &dyn Any| {
            any.downcast_ref::<T>().is_some_and(|target| condition(target))
        }));
        self
    }

    /// Chooses the related contract per resource instead of the declared
    /// related type, for relationships whose backing id may point at
    /// different resource types.
    pub fn related_type<F>(&mut self, select: F) -> &mut Self
    where
        F: Fn(&T) -> TypeHandle + Send + Sync + 'static,
    {
        let fallback = self.relationship.declared_related_type();
        self.relationship.info_mut().selector = Some(Arc::new(move |any: &dyn Any| {
            any.downcast_ref::<T>().map_or(fallback, |target| select(target))
        }));
        self
    }
}
