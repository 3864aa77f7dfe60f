//! Caller-owned resource nodes and their type-erased handles.
//!
//! Resources live in `Rc<RefCell<T>>` so that graphs can hold back-references
//! (`post.comments[i].post == post`). The codec only ever sees a
//! [`ResourceRef`], which remembers the concrete type through a
//! [`TypeHandle`] and can be downcast back to `Shared<T>`.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A shared, mutable resource node.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` as a [`Shared`] node.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Stable identity of a resource type, used as the resolver key.
#[derive(Debug, Clone, Copy)]
pub struct TypeHandle {
    id: TypeId,
    name: &'static str,
}

impl TypeHandle {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The Rust type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

trait ResourceCell {
    fn type_handle(&self) -> TypeHandle;
    fn borrow_any(&self) -> Ref<'_, dyn Any>;
    fn borrow_any_mut(&self) -> RefMut<'_, dyn Any>;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> ResourceCell for RefCell<T> {
    fn type_handle(&self) -> TypeHandle {
        TypeHandle::of::<T>()
    }

    fn borrow_any(&self) -> Ref<'_, dyn Any> {
        Ref::map(self.borrow(), |value| value as &dyn Any)
    }

    fn borrow_any_mut(&self) -> RefMut<'_, dyn Any> {
        RefMut::map(self.borrow_mut(), |value| value as &mut dyn Any)
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A type-erased handle to a [`Shared`] resource node.
///
/// Cloning the handle clones the `Rc`, never the resource.
#[derive(Clone)]
pub struct ResourceRef {
    cell: Rc<dyn ResourceCell>,
}

impl ResourceRef {
    pub fn new<T: 'static>(resource: &Shared<T>) -> Self {
        Self {
            cell: resource.clone(),
        }
    }

    /// Wraps a fresh value in a new node.
    pub fn from_value<T: 'static>(value: T) -> Self {
        Self::new(&shared(value))
    }

    pub fn type_handle(&self) -> TypeHandle {
        self.cell.type_handle()
    }

    /// Recovers the typed node, or `None` when `T` is not the node's type.
    pub fn downcast<T: 'static>(&self) -> Option<Shared<T>> {
        self.cell.clone().into_any().downcast::<RefCell<T>>().ok()
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &ResourceRef) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.cell) as *const (),
            Rc::as_ptr(&other.cell) as *const (),
        )
    }

    pub(crate) fn borrow(&self) -> Ref<'_, dyn Any> {
        self.cell.borrow_any()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, dyn Any> {
        self.cell.borrow_any_mut()
    }
}

impl<T: 'static> From<Shared<T>> for ResourceRef {
    fn from(resource: Shared<T>) -> Self {
        Self { cell: resource }
    }
}

impl<T: 'static> From<&Shared<T>> for ResourceRef {
    fn from(resource: &Shared<T>) -> Self {
        Self::new(resource)
    }
}

impl std::fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRef")
            .field("type", &self.type_handle().name())
            .field("ptr", &(Rc::as_ptr(&self.cell) as *const ()))
            .finish()
    }
}

/// Load state of a relationship member.
///
/// `Unloaded` relationships are left out of the document entirely, `Null`
/// ones are written as `data: null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Linked<T> {
    Unloaded,
    Null,
    Value(T),
}

impl<T> Default for Linked<T> {
    fn default() -> Self {
        Linked::Unloaded
    }
}

impl<T> Linked<T> {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Linked::Unloaded)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Linked::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Linked<U> {
        match self {
            Linked::Unloaded => Linked::Unloaded,
            Linked::Null => Linked::Null,
            Linked::Value(v) => Linked::Value(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Linked<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Linked::Null, Linked::Value)
    }
}

/// Primary data handed to, or returned from, the codec.
#[derive(Debug, Clone)]
pub enum ResourceData {
    Single(Option<ResourceRef>),
    Collection(Vec<ResourceRef>),
}

impl ResourceData {
    pub fn single(resource: impl Into<ResourceRef>) -> Self {
        ResourceData::Single(Some(resource.into()))
    }

    pub fn collection<R: Into<ResourceRef>>(resources: impl IntoIterator<Item = R>) -> Self {
        ResourceData::Collection(resources.into_iter().map(Into::into).collect())
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ResourceData::Collection(_))
    }

    /// Every root resource, in order.
    pub fn roots(&self) -> &[ResourceRef] {
        match self {
            ResourceData::Single(Some(r)) => std::slice::from_ref(r),
            ResourceData::Single(None) => &[],
            ResourceData::Collection(items) => items,
        }
    }

    /// The single resource as `T`, if the data is a single resource of that
    /// type.
    pub fn as_single<T: 'static>(&self) -> Option<Shared<T>> {
        match self {
            ResourceData::Single(Some(r)) => r.downcast(),
            _ => None,
        }
    }

    /// Every root resource of type `T`.
    pub fn as_collection<T: 'static>(&self) -> Vec<Shared<T>> {
        self.roots().iter().filter_map(ResourceRef::downcast).collect()
    }
}
