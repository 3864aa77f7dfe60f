//! Scalar members of a contract: the id, attributes, calculated values and
//! non-emitted members used as relationship backing fields.

use std::any::Any;
use std::sync::Arc;

use crate::converter::ValueConverter;
use crate::error::ConversionError;
use crate::scalar::{Scalar, ScalarKind, ScalarType};

pub(crate) type Getter = Arc<dyn Fn(&dyn Any) -> Scalar + Send + Sync>;
pub(crate) type Setter = Arc<dyn Fn(&mut dyn Any, Scalar) -> Result<(), ConversionError> + Send + Sync>;
pub(crate) type Resetter = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Id,
    /// Emitted as an attribute and assigned on deserialize.
    Attribute,
    /// Evaluated at serialize time; never deserialized.
    Calculated,
    /// Declared for use as a backing field; never emitted.
    Member,
}

#[derive(Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    scalar_kind: ScalarKind,
    nullable: bool,
    converter: Option<Arc<dyn ValueConverter>>,
    get: Getter,
    set: Option<Setter>,
    reset: Option<Resetter>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("scalar_kind", &self.scalar_kind)
            .field("nullable", &self.nullable)
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

impl Field {
    /// A read/write member backed by `get`/`set` on `T`.
    pub(crate) fn accessor<T, V, G, S>(name: String, kind: FieldKind, get: G, set: S) -> Self
    where
        T: 'static,
        V: ScalarType,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let set = Arc::new(set);
        let set_absent = set.clone();
        Self {
            name,
            kind,
            scalar_kind: V::KIND,
            nullable: V::NULLABLE,
            converter: None,
            get: erase_get(get),
            set: Some(Arc::new(move |any: &mut dyn Any, value: Scalar| {
                let typed = V::from_scalar(value)?;
                if let Some(target) = any.downcast_mut::<T>() {
                    set(target, typed);
                }
                Ok(())
            })),
            reset: Some(Arc::new(move |any: &mut dyn Any| {
                if let Some(target) = any.downcast_mut::<T>() {
                    set_absent(target, V::from_absent());
                }
            })),
        }
    }

    pub(crate) fn calculated<T, V, F>(name: String, calc: F) -> Self
    where
        T: 'static,
        V: ScalarType,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            name,
            kind: FieldKind::Calculated,
            scalar_kind: V::KIND,
            nullable: V::NULLABLE,
            converter: None,
            get: erase_get(calc),
            set: None,
            reset: None,
        }
    }

    pub(crate) fn with_converter(mut self, converter: Arc<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn scalar_kind(&self) -> ScalarKind {
        self.scalar_kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_calculated(&self) -> bool {
        self.kind == FieldKind::Calculated
    }

    /// Whether the field appears in `attributes`.
    pub fn is_emitted(&self) -> bool {
        matches!(self.kind, FieldKind::Attribute | FieldKind::Calculated)
    }

    pub fn converter(&self) -> Option<&Arc<dyn ValueConverter>> {
        self.converter.as_ref()
    }

    pub(crate) fn read(&self, resource: &dyn Any) -> Scalar {
        (self.get)(resource)
    }

    /// Assigns `value`. Calculated fields ignore writes.
    pub(crate) fn write(&self, resource: &mut dyn Any, value: Scalar) -> Result<(), ConversionError> {
        match &self.set {
            Some(set) => set(resource, value),
            None => Ok(()),
        }
    }

    /// Assigns the type's "absent" value (`None`, zero, empty).
    pub(crate) fn clear(&self, resource: &mut dyn Any) {
        if let Some(reset) = &self.reset {
            reset(resource);
        }
    }
}

pub(crate) fn erase_get<T, V, G>(get: G) -> Getter
where
    T: 'static,
    V: ScalarType,
    G: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move |any: &dyn Any| {
        any.downcast_ref::<T>()
            .map_or(Scalar::Null, |target| get(target).into_scalar())
    })
}
