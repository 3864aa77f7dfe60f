//! Builder validation and resolver lookups.

mod common;

use std::sync::Arc;

use common::{blog, blog_builder, Comment, Post, User};
use hypermedia::{
    ContractBuilder, ContractResolver, ContractValidationError, Error, FieldKind, ScalarKind, Shared,
    TypeHandle,
};

fn validation_error(result: hypermedia::Result<ContractResolver>) -> ContractValidationError {
    match result {
        Err(Error::ContractValidation(err)) => err,
        Err(other) => panic!("expected a validation error, got {other}"),
        Ok(_) => panic!("expected a validation error, build succeeded"),
    }
}

#[test]
fn every_contract_resolves_to_itself() {
    let resolver = blog();
    assert_eq!(resolver.contracts().len(), 3);
    for contract in resolver.contracts() {
        let by_type = resolver.try_resolve(contract.type_handle()).unwrap();
        assert!(Arc::ptr_eq(by_type, contract));
        let by_name = resolver.try_resolve_by_resource_type(contract.resource_type()).unwrap();
        assert!(Arc::ptr_eq(by_name, contract));
    }
}

#[test]
fn unknown_lookups_are_not_errors() {
    let resolver = blog();
    assert!(resolver.try_resolve(TypeHandle::of::<String>()).is_none());
    assert!(resolver.try_resolve_by_resource_type("tags").is_none());
}

#[test]
fn contract_describes_declared_members() {
    let resolver = blog();
    let posts = resolver.try_resolve_type::<Post>().unwrap();
    assert_eq!(posts.resource_type(), "posts");
    assert_eq!(posts.id_field().name(), "Id");
    assert_eq!(posts.id_field().scalar_kind(), ScalarKind::Int32);

    let names: Vec<&str> = posts.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        [
            "Title",
            "Subtitle",
            "Published",
            "Rating",
            "Views",
            "CreatedAt",
            "OwnerUserId",
            "ApproverId",
            "TitleLength"
        ]
    );
    assert!(posts.field("Subtitle").unwrap().is_nullable());
    assert_eq!(posts.field("OwnerUserId").unwrap().kind(), FieldKind::Member);
    assert!(posts.field("TitleLength").unwrap().is_calculated());

    let owner = posts.relationship("OwnerUser").unwrap();
    assert!(owner.is_belongs_to());
    assert_eq!(owner.backing_field(), Some("OwnerUserId"));
    assert_eq!(owner.declared_related_type(), TypeHandle::of::<User>());
    assert_eq!(owner.link().map(|l| l.template()), Some("/v1/users/{id}"));

    let comments = posts.relationship("Comments").unwrap();
    assert!(!comments.is_belongs_to());
    assert_eq!(comments.inverse(), Some("Post"));
    assert_eq!(comments.declared_related_type(), TypeHandle::of::<Comment>());
}

#[test]
fn resolver_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ContractResolver>();

    let resolver = Arc::new(blog());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || resolver.try_resolve_by_resource_type("comments").is_some())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn build_is_single_use() {
    let mut builder = blog_builder();
    assert!(builder.build().is_ok());
    assert!(matches!(builder.build(), Err(Error::InvalidOperation(_))));
}

#[test]
fn failed_build_also_consumes_builder() {
    let mut builder = ContractBuilder::new();
    builder.with::<User>("users");
    assert!(builder.build().is_err());
    assert!(matches!(builder.build(), Err(Error::InvalidOperation(_))));
}

#[test]
fn rejects_missing_id() {
    let mut builder = ContractBuilder::new();
    builder
        .with::<User>("users")
        .attribute("DisplayName", |u| u.display_name.clone(), |u, v| u.display_name = v);
    assert_eq!(
        validation_error(builder.build()),
        ContractValidationError::MissingId {
            resource_type: "users".into()
        }
    );
}

#[test]
fn rejects_missing_backing_field() {
    let mut builder = ContractBuilder::new();
    builder.with::<User>("users").id("Id", |u| u.id, |u, v| u.id = v);
    let mut posts = builder.with::<Post>("posts");
    posts.id("Id", |p| p.id, |p, v| p.id = v);
    posts
        .belongs_to(
            "OwnerUser",
            |p| p.owner_user.clone(),
            |p, v: Option<Shared<User>>| p.owner_user = v,
        )
        .backing_field("OwnerUserId");
    assert_eq!(
        validation_error(builder.build()),
        ContractValidationError::MissingBackingField {
            resource_type: "posts".into(),
            relationship: "OwnerUser".into(),
            field: "OwnerUserId".into(),
        }
    );
}

#[test]
fn calculated_field_cannot_back_a_relationship() {
    let mut builder = ContractBuilder::new();
    builder.with::<User>("users").id("Id", |u| u.id, |u, v| u.id = v);
    let mut posts = builder.with::<Post>("posts");
    posts
        .id("Id", |p| p.id, |p, v| p.id = v)
        .calculated("OwnerUserId", |p| p.owner_user_id);
    posts
        .belongs_to(
            "OwnerUser",
            |p| p.owner_user.clone(),
            |p, v: Option<Shared<User>>| p.owner_user = v,
        )
        .backing_field("OwnerUserId");
    assert!(matches!(
        validation_error(builder.build()),
        ContractValidationError::MissingBackingField { .. }
    ));
}

#[test]
fn rejects_missing_inverse() {
    let mut builder = ContractBuilder::new();
    builder.with::<Comment>("comments").id("Id", |c| c.id, |c, v| c.id = v);
    let mut posts = builder.with::<Post>("posts");
    posts.id("Id", |p| p.id, |p, v| p.id = v);
    posts
        .has_many(
            "Comments",
            |p| p.comments.clone(),
            |p, v: Option<Vec<Shared<Comment>>>| p.comments = v.into(),
        )
        .inverse("Post");
    assert_eq!(
        validation_error(builder.build()),
        ContractValidationError::MissingInverse {
            resource_type: "posts".into(),
            relationship: "Comments".into(),
            related_type: "comments".into(),
            inverse: "Post".into(),
        }
    );
}

#[test]
fn inverse_requires_related_contract() {
    let mut builder = ContractBuilder::new();
    let mut posts = builder.with::<Post>("posts");
    posts.id("Id", |p| p.id, |p, v| p.id = v);
    posts
        .has_many(
            "Comments",
            |p| p.comments.clone(),
            |p, v: Option<Vec<Shared<Comment>>>| p.comments = v.into(),
        )
        .inverse("Post");
    assert!(matches!(
        validation_error(builder.build()),
        ContractValidationError::UnknownRelatedType { .. }
    ));
}

#[test]
fn rejects_colliding_resource_types() {
    let mut builder = ContractBuilder::new();
    builder.with::<User>("people").id("Id", |u| u.id, |u, v| u.id = v);
    builder.with::<Comment>("people").id("Id", |c| c.id, |c, v| c.id = v);
    assert!(matches!(
        validation_error(builder.build()),
        ContractValidationError::DuplicateResourceType { resource_type, .. } if resource_type == "people"
    ));
}

#[test]
fn rejects_type_declared_twice() {
    let mut builder = ContractBuilder::new();
    builder.with::<User>("users").id("Id", |u| u.id, |u, v| u.id = v);
    builder.with::<User>("people").id("Id", |u| u.id, |u, v| u.id = v);
    assert!(matches!(
        validation_error(builder.build()),
        ContractValidationError::DuplicateType { .. }
    ));
}

#[test]
fn rejects_duplicate_member_names() {
    let mut builder = ContractBuilder::new();
    builder
        .with::<User>("users")
        .id("Id", |u| u.id, |u, v| u.id = v)
        .attribute("DisplayName", |u| u.display_name.clone(), |u, v| u.display_name = v)
        .calculated("DisplayName", |u| u.display_name.len() as i64);
    assert_eq!(
        validation_error(builder.build()),
        ContractValidationError::DuplicateMember {
            resource_type: "users".into(),
            member: "DisplayName".into(),
        }
    );
}
