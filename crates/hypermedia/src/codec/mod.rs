//! Turns resource graphs into JSON:API documents and back.
//!
//! The codec borrows a [`ContractResolver`] and keeps no state between calls.
//! Every call owns its own visited set and identity map.

mod deserialize;
mod include;
mod serialize;

use crate::document::{Document, ResourceIdentifier};
use crate::error::Result;
use crate::options::{DeserializeOptions, SerializeOptions};
use crate::resolver::ContractResolver;
use crate::resource::{ResourceData, ResourceRef};

pub struct DocumentCodec<'r> {
    resolver: &'r ContractResolver,
}

impl<'r> DocumentCodec<'r> {
    pub fn new(resolver: &'r ContractResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &'r ContractResolver {
        self.resolver
    }

    /// Serializes `data` with its relationships and the resources reached
    /// through `options.include`.
    ///
    /// Fails with [`crate::Error::UnresolvedContract`] when a root has no
    /// contract. Related resources without one are left out.
    pub fn serialize(&self, data: &ResourceData, options: &SerializeOptions) -> Result<Document> {
        serialize::Serializer::new(self.resolver, options).run(data)
    }

    /// Rebuilds the resource graph described by `document`.
    ///
    /// Fails with [`crate::Error::UnknownResourceType`] when a primary
    /// resource's type is not registered. Included resources of unknown
    /// types, and linkages to resources that are not in the document, are
    /// dropped.
    pub fn deserialize(&self, document: &Document, options: &DeserializeOptions) -> Result<ResourceData> {
        deserialize::Deserializer::new(self.resolver, options).run(document)
    }

    /// Parses JSON text and deserializes it.
    pub fn deserialize_str(&self, text: &str, options: &DeserializeOptions) -> Result<ResourceData> {
        self.deserialize(&Document::parse(text)?, options)
    }

    /// The `{type, id}` a resource serializes under, if it has a contract and
    /// a non-null id.
    pub fn identify(&self, resource: &ResourceRef) -> Option<ResourceIdentifier> {
        let contract = self.resolver.try_resolve(resource.type_handle())?;
        let id = contract.id_field().read(&*resource.borrow()).to_text()?;
        Some(ResourceIdentifier::new(contract.resource_type(), id))
    }
}
