//! The frozen lookup table produced by
//! [`crate::ContractBuilder::build`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::contract::Contract;
use crate::converter::ConverterRegistry;
use crate::error::{Error, Result};
use crate::resource::{ResourceRef, TypeHandle};

/// Maps runtime types and wire type names to their contracts.
///
/// Immutable after construction; share it behind an `Arc` across threads.
#[derive(Debug, Clone)]
pub struct ContractResolver {
    contracts: Vec<Arc<Contract>>,
    by_type: HashMap<TypeHandle, Arc<Contract>>,
    by_name: HashMap<String, Arc<Contract>>,
    converters: Arc<ConverterRegistry>,
}

impl ContractResolver {
    pub(crate) fn new(contracts: Vec<Contract>, converters: Arc<ConverterRegistry>) -> Self {
        let contracts: Vec<Arc<Contract>> = contracts.into_iter().map(Arc::new).collect();
        let by_type = contracts
            .iter()
            .map(|c| (c.type_handle(), Arc::clone(c)))
            .collect();
        let by_name = contracts
            .iter()
            .map(|c| (c.resource_type().to_owned(), Arc::clone(c)))
            .collect();
        Self {
            contracts,
            by_type,
            by_name,
            converters,
        }
    }

    pub fn try_resolve(&self, handle: TypeHandle) -> Option<&Arc<Contract>> {
        self.by_type.get(&handle)
    }

    pub fn try_resolve_type<T: 'static>(&self) -> Option<&Arc<Contract>> {
        self.try_resolve(TypeHandle::of::<T>())
    }

    pub fn try_resolve_by_resource_type(&self, resource_type: &str) -> Option<&Arc<Contract>> {
        self.by_name.get(resource_type)
    }

    /// Resolves the contract of a root resource, failing with
    /// [`Error::UnresolvedContract`].
    pub fn resolve(&self, resource: &ResourceRef) -> Result<&Arc<Contract>> {
        let handle = resource.type_handle();
        self.try_resolve(handle)
            .ok_or(Error::UnresolvedContract(handle.name()))
    }

    /// Every contract, in declaration order.
    pub fn contracts(&self) -> &[Arc<Contract>] {
        &self.contracts
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }
}
