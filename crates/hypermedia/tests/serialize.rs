//! Resource graph → document.

mod common;

use chrono::{TimeZone, Utc};
use common::{blog, post, post_with_comments, user, Post, User};
use std::collections::HashSet;

use hypermedia::{
    shared, ContractBuilder, DocumentCodec, Error, FieldNaming, Linked, PrimaryData, ResourceData,
    ResourceIdentifier, ResourceRef, SerializeOptions, Shared,
};
use serde_json::{json, Value};

fn serialize(data: &ResourceData, options: &SerializeOptions) -> Value {
    let resolver = blog();
    let document = DocumentCodec::new(&resolver).serialize(data, options).unwrap();
    Value::from(document.to_json())
}

fn camel() -> SerializeOptions {
    SerializeOptions::new(FieldNaming::Camel)
}

#[test]
fn belongs_to_uses_backing_field_and_template() {
    let p = post(1, "Hello");
    p.borrow_mut().owner_user_id = Some(5);
    let doc = serialize(&ResourceData::single(p), &camel());
    assert_eq!(
        doc["data"]["relationships"]["ownerUser"],
        json!({
            "data": {"type": "users", "id": "5"},
            "links": {"related": "/v1/users/5"}
        })
    );
}

#[test]
fn backing_field_wins_over_loaded_object() {
    let p = post(1, "Hello");
    {
        let mut value = p.borrow_mut();
        value.owner_user_id = Some(5);
        value.owner_user = Some(user(6, "someone else"));
    }
    let doc = serialize(&ResourceData::single(p), &camel());
    assert_eq!(doc["data"]["relationships"]["ownerUser"]["data"]["id"], json!("5"));
}

#[test]
fn null_backing_field_is_null_linkage_without_link() {
    let doc = serialize(&ResourceData::single(post(1, "Hello")), &camel());
    assert_eq!(doc["data"]["relationships"]["ownerUser"], json!({"data": null}));
}

#[test]
fn full_resource_object() {
    let p = post(1, "Hello");
    {
        let mut value = p.borrow_mut();
        value.rating = 4.5;
        value.views = 1_000_000_000_000;
        value.created_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    }
    let doc = serialize(&ResourceData::single(p), &SerializeOptions::new(FieldNaming::Dash));
    assert_eq!(
        doc,
        json!({
            "data": {
                "type": "posts",
                "id": "1",
                "attributes": {
                    "title": "Hello",
                    "subtitle": null,
                    "published": false,
                    "rating": 4.5,
                    "views": 1_000_000_000_000i64,
                    "created-at": "2024-03-01T08:00:00Z",
                    "title-length": 5
                },
                "relationships": {
                    "owner-user": {"data": null}
                },
                "links": {"self": "/v1/posts/1"}
            }
        })
    );
}

#[test]
fn conditional_relationship_is_absent_when_false() {
    let p = post(1, "Draft");
    p.borrow_mut().approver_id = Some(3);
    let doc = serialize(&ResourceData::single(p.clone()), &camel());
    assert!(doc["data"]["relationships"].get("approver").is_none());

    p.borrow_mut().published = true;
    let doc = serialize(&ResourceData::single(p), &camel());
    assert_eq!(
        doc["data"]["relationships"]["approver"],
        json!({"data": {"type": "users", "id": "3"}})
    );
}

#[test]
fn has_many_distinguishes_null_empty_and_unloaded() {
    let p = post(1, "Hello");
    let doc = serialize(&ResourceData::single(p.clone()), &camel());
    assert!(doc["data"]["relationships"].get("comments").is_none());

    p.borrow_mut().comments = Linked::Null;
    let doc = serialize(&ResourceData::single(p.clone()), &camel());
    assert_eq!(
        doc["data"]["relationships"]["comments"],
        json!({"data": null, "links": {"related": "/v1/posts/1/comments"}})
    );

    p.borrow_mut().comments = Linked::Value(Vec::new());
    let doc = serialize(&ResourceData::single(p), &camel());
    assert_eq!(doc["data"]["relationships"]["comments"]["data"], json!([]));
}

#[test]
fn cyclic_graph_terminates_and_root_is_not_included() {
    let (p, _comments) = post_with_comments(1, &[10, 11]);
    let options = camel().include(["comments", "comments.post", "comments.post.comments"]);
    let doc = serialize(&ResourceData::single(p), &options);
    assert_eq!(
        doc["data"]["relationships"]["comments"]["data"],
        json!([{"type": "comments", "id": "10"}, {"type": "comments", "id": "11"}])
    );
    let included = doc["included"].as_array().unwrap();
    let keys: Vec<(&str, &str)> = included
        .iter()
        .map(|r| (r["type"].as_str().unwrap(), r["id"].as_str().unwrap()))
        .collect();
    assert_eq!(keys, [("comments", "10"), ("comments", "11")]);
    assert_eq!(
        included[0]["relationships"]["post"],
        json!({"data": {"type": "posts", "id": "1"}})
    );
}

#[test]
fn shared_post_is_included_once() {
    let (_p, comments) = post_with_comments(1, &[10, 11]);
    let data = ResourceData::collection(comments);
    let doc = serialize(&data, &camel().include(["post", "post.comments"]));
    let included = doc["included"].as_array().unwrap();
    assert_eq!(included.len(), 1);
    assert_eq!(included[0]["type"], json!("posts"));
    assert_eq!(doc["data"].as_array().unwrap().len(), 2);
}

#[test]
fn include_walks_through_a_root_to_deeper_segments() {
    let (p, _comments) = post_with_comments(1, &[10]);
    p.borrow_mut().owner_user = Some(user(5, "kuwaly"));
    p.borrow_mut().owner_user_id = Some(5);
    let doc = serialize(&ResourceData::single(p), &camel().include(["comments.post.ownerUser"]));
    let types: Vec<&str> = doc["included"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["comments", "users"]);
}

#[test]
fn included_resources_are_distinct_and_cover_linkage() {
    let (p, _comments) = post_with_comments(1, &[10, 11]);
    p.borrow_mut().owner_user = Some(user(5, "kuwaly"));
    p.borrow_mut().owner_user_id = Some(5);
    let resolver = blog();
    let codec = DocumentCodec::new(&resolver);
    let root = ResourceRef::from(p);
    let document = codec
        .serialize(
            &ResourceData::Single(Some(root.clone())),
            &camel().include(["comments.post", "ownerUser"]),
        )
        .unwrap();

    let keys: Vec<ResourceIdentifier> = document.resources().filter_map(|r| r.identifier()).collect();
    let distinct: HashSet<&ResourceIdentifier> = keys.iter().collect();
    assert_eq!(keys.len(), 4);
    assert_eq!(distinct.len(), keys.len());
    assert_eq!(codec.identify(&root), Some(ResourceIdentifier::new("posts", "1")));
    assert_eq!(keys[0], ResourceIdentifier::new("posts", "1"));

    for resource in document.resources() {
        for (name, member) in &resource.relationships {
            let linkage = member.data.as_ref().unwrap();
            for target in linkage.identifiers() {
                assert!(distinct.contains(target), "{name} links to {target:?} outside the document");
            }
        }
    }
}

#[test]
fn include_segments_follow_naming() {
    let p = post(1, "Hello");
    p.borrow_mut().owner_user = Some(user(5, "kuwaly"));
    let doc = serialize(&ResourceData::single(p), &SerializeOptions::new(FieldNaming::Snake).include(["owner_user"]));
    assert_eq!(
        doc["included"],
        json!([{"type": "users", "id": "5", "attributes": {"display_name": "kuwaly"}}])
    );
}

#[test]
fn sparse_fieldsets_limit_members() {
    let p = post(1, "Hello");
    p.borrow_mut().owner_user_id = Some(5);
    let options = camel().fields("posts", ["title", "ownerUser"]);
    let doc = serialize(&ResourceData::single(p), &options);
    assert_eq!(doc["data"]["attributes"], json!({"title": "Hello"}));
    let relationships = doc["data"]["relationships"].as_object().unwrap();
    assert_eq!(relationships.keys().collect::<Vec<_>>(), ["ownerUser"]);
}

#[test]
fn resource_links_can_be_disabled() {
    let options = SerializeOptions {
        resource_links: false,
        ..camel()
    };
    let doc = serialize(&ResourceData::single(post(1, "Hello")), &options);
    assert!(doc["data"].get("links").is_none());
}

#[test]
fn collection_and_empty_single() {
    let doc = serialize(&ResourceData::collection([post(1, "a"), post(2, "b")]), &camel());
    assert_eq!(doc["data"].as_array().unwrap().len(), 2);

    let doc = serialize(&ResourceData::Single(None), &camel());
    assert_eq!(doc, json!({"data": null}));

    let doc = serialize(&ResourceData::collection(Vec::<Shared<Post>>::new()), &camel());
    assert_eq!(doc, json!({"data": []}));
}

#[test]
fn unregistered_root_fails() {
    struct Tag;
    let resolver = blog();
    let err = DocumentCodec::new(&resolver)
        .serialize(&ResourceData::single(shared(Tag)), &camel())
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvedContract(name) if name.ends_with("Tag")));
}

#[test]
fn unregistered_related_resource_is_skipped() {
    let mut builder = ContractBuilder::new();
    let mut posts = builder.with::<Post>("posts");
    posts.id("Id", |p| p.id, |p, v| p.id = v);
    posts.belongs_to(
        "OwnerUser",
        |p| p.owner_user.clone(),
        |p, v: Option<Shared<User>>| p.owner_user = v,
    );
    let resolver = builder.build().unwrap();

    let p = post(1, "Hello");
    p.borrow_mut().owner_user = Some(user(5, "kuwaly"));
    let doc = DocumentCodec::new(&resolver)
        .serialize(&ResourceData::single(p), &camel().include(["ownerUser"]))
        .unwrap();
    assert!(doc.included.is_empty());
    let PrimaryData::Single(object) = doc.data.unwrap() else {
        panic!("expected a single resource");
    };
    assert!(object.relationships.is_empty());
}

#[test]
fn non_finite_float_is_a_conversion_error() {
    let p = post(1, "Hello");
    p.borrow_mut().rating = f64::NAN;
    let resolver = blog();
    let err = DocumentCodec::new(&resolver)
        .serialize(&ResourceData::single(p), &camel())
        .unwrap_err();
    assert!(matches!(err, Error::Conversion { field, .. } if field == "Rating"));
}
