//! Relationship declarations: belongs-to and has-many linkage between
//! contracts.

use std::any::Any;
use std::sync::Arc;

use super::field::{Field, Getter};
use crate::resource::{Linked, ResourceRef, TypeHandle};

pub(crate) type Predicate = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;
pub(crate) type TypeSelector = Arc<dyn Fn(&dyn Any) -> TypeHandle + Send + Sync>;
pub(crate) type OneGetter = Arc<dyn Fn(&dyn Any) -> Linked<ResourceRef> + Send + Sync>;
pub(crate) type OneSetter = Arc<dyn Fn(&mut dyn Any, Option<ResourceRef>) -> bool + Send + Sync>;
pub(crate) type ManyGetter = Arc<dyn Fn(&dyn Any) -> Linked<Vec<ResourceRef>> + Send + Sync>;
pub(crate) type ManySetter = Arc<dyn Fn(&mut dyn Any, Option<Vec<ResourceRef>>) -> bool + Send + Sync>;

/// A URL template such as `/v1/users/{id}` whose `{param}` placeholder is
/// filled from the resource.
#[derive(Clone)]
pub struct LinkTemplate {
    template: String,
    param: String,
    extract: Getter,
}

impl std::fmt::Debug for LinkTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkTemplate")
            .field("template", &self.template)
            .field("param", &self.param)
            .finish()
    }
}

impl LinkTemplate {
    pub(crate) fn new(template: String, param: String, extract: Getter) -> Self {
        Self {
            template,
            param,
            extract,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    /// Renders the link for `resource`. `None` when the extracted value is
    /// null or the template has no `{param}` placeholder.
    pub(crate) fn render(&self, resource: &dyn Any) -> Option<String> {
        let placeholder = format!("{{{}}}", self.param);
        if !self.template.contains(&placeholder) {
            return None;
        }
        let value = (self.extract)(resource).to_text()?;
        Some(self.template.replace(&placeholder, &value))
    }
}

/// Settings shared by both relationship kinds.
#[derive(Clone)]
pub struct RelationshipInfo {
    pub(crate) name: String,
    pub(crate) related: TypeHandle,
    pub(crate) selector: Option<TypeSelector>,
    pub(crate) inverse: Option<String>,
    pub(crate) condition: Option<Predicate>,
    pub(crate) link: Option<LinkTemplate>,
}

impl RelationshipInfo {
    pub(crate) fn new(name: String, related: TypeHandle) -> Self {
        Self {
            name,
            related,
            selector: None,
            inverse: None,
            condition: None,
            link: None,
        }
    }
}

#[derive(Clone)]
pub struct BelongsTo {
    pub(crate) info: RelationshipInfo,
    pub(crate) backing_field: Option<String>,
    pub(crate) backing: Option<Field>,
    pub(crate) get: OneGetter,
    pub(crate) set: OneSetter,
}

#[derive(Clone)]
pub struct HasMany {
    pub(crate) info: RelationshipInfo,
    pub(crate) get: ManyGetter,
    pub(crate) set: ManySetter,
}

#[derive(Clone)]
pub enum Relationship {
    BelongsTo(BelongsTo),
    HasMany(HasMany),
}

impl std::fmt::Debug for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = self.info();
        let mut s = f.debug_struct(match self {
            Relationship::BelongsTo(_) => "BelongsTo",
            Relationship::HasMany(_) => "HasMany",
        });
        s.field("name", &info.name)
            .field("related", &info.related.name())
            .field("inverse", &info.inverse);
        if let Relationship::BelongsTo(rel) = self {
            s.field("backing_field", &rel.backing_field);
        }
        s.field("link", &info.link).finish()
    }
}

impl Relationship {
    pub(crate) fn info(&self) -> &RelationshipInfo {
        match self {
            Relationship::BelongsTo(rel) => &rel.info,
            Relationship::HasMany(rel) => &rel.info,
        }
    }

    pub(crate) fn info_mut(&mut self) -> &mut RelationshipInfo {
        match self {
            Relationship::BelongsTo(rel) => &mut rel.info,
            Relationship::HasMany(rel) => &mut rel.info,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn is_belongs_to(&self) -> bool {
        matches!(self, Relationship::BelongsTo(_))
    }

    pub fn inverse(&self) -> Option<&str> {
        self.info().inverse.as_deref()
    }

    pub fn backing_field(&self) -> Option<&str> {
        match self {
            Relationship::BelongsTo(rel) => rel.backing_field.as_deref(),
            Relationship::HasMany(_) => None,
        }
    }

    pub fn link(&self) -> Option<&LinkTemplate> {
        self.info().link.as_ref()
    }

    /// The declared related type, ignoring any per-resource selector.
    pub fn declared_related_type(&self) -> TypeHandle {
        self.info().related
    }

    /// The type the related value resolves against for `resource`.
    pub(crate) fn related_type(&self, resource: &dyn Any) -> TypeHandle {
        let info = self.info();
        match &info.selector {
            Some(select) => select(resource),
            None => info.related,
        }
    }

    /// Whether the relationship is emitted at all for `resource`.
    pub(crate) fn applies_to(&self, resource: &dyn Any) -> bool {
        self.info().condition.as_ref().map_or(true, |cond| cond(resource))
    }
}
