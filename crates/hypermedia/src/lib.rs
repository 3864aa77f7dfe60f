//! `hypermedia` — declarative resource contracts and a JSON:API document
//! codec for in-memory resource graphs.
//!
//! Resource types are described once through a [`ContractBuilder`]; the
//! resulting [`ContractResolver`] is immutable and drives a stateless
//! [`DocumentCodec`].
//!
//! # Example
//!
//! ```
//! use hypermedia::{
//!     shared, ContractBuilder, DeserializeOptions, DocumentCodec, FieldNaming, ResourceData,
//!     SerializeOptions, Shared,
//! };
//!
//! #[derive(Default)]
//! struct User { id: i32, display_name: String }
//!
//! #[derive(Default)]
//! struct Post { id: i32, title: String, owner_user_id: Option<i32>, owner_user: Option<Shared<User>> }
//!
//! let mut builder = ContractBuilder::new();
//! builder
//!     .with::<User>("users")
//!     .id("Id", |u| u.id, |u, v| u.id = v)
//!     .attribute("DisplayName", |u| u.display_name.clone(), |u, v| u.display_name = v);
//! let mut posts = builder.with::<Post>("posts");
//! posts
//!     .id("Id", |p| p.id, |p, v| p.id = v)
//!     .attribute("Title", |p| p.title.clone(), |p, v| p.title = v)
//!     .member("OwnerUserId", |p| p.owner_user_id, |p, v| p.owner_user_id = v);
//! posts
//!     .belongs_to("OwnerUser", |p| p.owner_user.clone(), |p, v| p.owner_user = v)
//!     .backing_field("OwnerUserId");
//! let resolver = builder.build().unwrap();
//! let codec = DocumentCodec::new(&resolver);
//!
//! let post = shared(Post { id: 1, title: "Hello".into(), owner_user_id: Some(5), owner_user: None });
//! let document = codec
//!     .serialize(&ResourceData::single(post), &SerializeOptions::new(FieldNaming::Camel))
//!     .unwrap();
//! assert_eq!(
//!     document.to_string(),
//!     r#"{"data":{"type":"posts","id":"1","attributes":{"title":"Hello"},"relationships":{"ownerUser":{"data":{"type":"users","id":"5"}}}}}"#
//! );
//!
//! let back = codec
//!     .deserialize(&document, &DeserializeOptions::new(FieldNaming::Camel))
//!     .unwrap()
//!     .as_single::<Post>()
//!     .unwrap();
//! assert_eq!(back.borrow().owner_user_id, Some(5));
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod contract;
pub mod converter;
pub mod document;
pub mod error;
pub mod naming;
pub mod options;
pub mod resolver;
pub mod resource;
pub mod scalar;

pub use codec::DocumentCodec;
pub use config::CodecConfig;
pub use contract::{Contract, ContractBuilder, Field, FieldKind, Relationship, RelationshipBuilder, TypeBuilder};
pub use converter::{ConverterRegistry, ValueConverter};
pub use document::{Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject};
pub use error::{ContractValidationError, ConversionError, DocumentError, Error, Result};
pub use hypermedia_json::JsonValue;
pub use naming::FieldNaming;
pub use options::{DeserializeOptions, RequestOptions, SerializeOptions, SortDirection, SortField};
pub use resolver::ContractResolver;
pub use resource::{shared, Linked, ResourceData, ResourceRef, Shared, TypeHandle};
pub use scalar::{Scalar, ScalarKind, ScalarType};
