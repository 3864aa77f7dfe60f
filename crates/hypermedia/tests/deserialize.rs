//! Document → resource graph.

mod common;

use std::rc::Rc;

use chrono::{TimeZone, Utc};
use common::{blog, Comment, Post, User};
use hypermedia::{
    DeserializeOptions, DocumentCodec, DocumentError, Error, FieldNaming, Linked, ResourceData,
};

fn deserialize(text: &str) -> hypermedia::Result<ResourceData> {
    let resolver = blog();
    DocumentCodec::new(&resolver).deserialize_str(text, &DeserializeOptions::new(FieldNaming::Camel))
}

fn single_post(text: &str) -> hypermedia::Shared<Post> {
    deserialize(text).unwrap().as_single::<Post>().unwrap()
}

#[test]
fn reads_attributes_and_included_owner() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"2","attributes":{"title":"T"},
            "relationships":{"ownerUser":{"data":{"type":"users","id":"9"}}}},
            "included":[{"type":"users","id":"9","attributes":{"displayName":"kuwaly"}}]}"#,
    );
    let post = post.borrow();
    assert_eq!(post.id, 2);
    assert_eq!(post.title, "T");
    assert_eq!(post.owner_user_id, Some(9));
    let owner = post.owner_user.as_ref().unwrap().borrow();
    assert_eq!(owner.id, 9);
    assert_eq!(owner.display_name, "kuwaly");
}

#[test]
fn keys_match_regardless_of_wire_casing() {
    let resolver = blog();
    let codec = DocumentCodec::new(&resolver);
    let text = r#"{"data":{"type":"posts","id":"2","attributes":{"created-at":"2024-03-01T10:00:00+02:00"}}}"#;
    for naming in [FieldNaming::None, FieldNaming::Camel, FieldNaming::Dash, FieldNaming::Snake] {
        let post = codec
            .deserialize_str(text, &DeserializeOptions::new(naming))
            .unwrap()
            .as_single::<Post>()
            .unwrap();
        assert_eq!(
            post.borrow().created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
    }
}

#[test]
fn linkage_outside_the_document_sets_only_backing_field() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"2","relationships":{"ownerUser":{"data":{"type":"users","id":"9"}}}}}"#,
    );
    assert_eq!(post.borrow().owner_user_id, Some(9));
    assert!(post.borrow().owner_user.is_none());
}

#[test]
fn null_belongs_to_clears_backing_field() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"2","relationships":{"ownerUser":{"data":null}}}}"#,
    );
    assert_eq!(post.borrow().owner_user_id, None);
    assert!(post.borrow().owner_user.is_none());

    let resolver = blog();
    let comment = DocumentCodec::new(&resolver)
        .deserialize_str(
            r#"{"data":{"type":"comments","id":"1","relationships":{"post":{"data":null}}}}"#,
            &DeserializeOptions::default(),
        )
        .unwrap()
        .as_single::<Comment>()
        .unwrap();
    assert_eq!(comment.borrow().post_id, 0);
}

#[test]
fn null_comments_stay_null() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1","relationships":{"comments":{"data":null}}}}"#,
    );
    assert!(matches!(post.borrow().comments, Linked::Null));
}

#[test]
fn empty_comments_stay_empty() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1","relationships":{"comments":{"data":[]}}}}"#,
    );
    assert!(matches!(&post.borrow().comments, Linked::Value(items) if items.is_empty()));
}

#[test]
fn absent_comments_stay_unloaded() {
    let post = single_post(r#"{"data":{"type":"posts","id":"1"}}"#);
    assert!(!post.borrow().comments.is_loaded());
}

#[test]
fn has_many_wires_inverse_and_drops_missing_linkage() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1","relationships":{"comments":{"data":[
                {"type":"comments","id":"10"},{"type":"comments","id":"11"}]}}},
            "included":[{"type":"comments","id":"10","attributes":{"body":"first"}}]}"#,
    );
    let comments = post.borrow().comments.value().cloned().unwrap();
    assert_eq!(comments.len(), 1);
    let comment = comments[0].borrow();
    assert_eq!(comment.body, "first");
    assert_eq!(comment.post_id, 1);
    assert!(Rc::ptr_eq(comment.post.as_ref().unwrap(), &post));
}

#[test]
fn belongs_to_wires_has_many_inverse_once() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1","relationships":{"comments":{"data":[{"type":"comments","id":"10"}]}}},
            "included":[{"type":"comments","id":"10","relationships":{"post":{"data":{"type":"posts","id":"1"}}}}]}"#,
    );
    let comments = post.borrow().comments.value().cloned().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(Rc::ptr_eq(comments[0].borrow().post.as_ref().unwrap(), &post));
}

#[test]
fn repeated_included_resource_is_linked_once() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1"},
            "included":[
                {"type":"comments","id":"10","attributes":{"body":"first"},
                 "relationships":{"post":{"data":{"type":"posts","id":"1"}}}},
                {"type":"comments","id":"10","attributes":{"body":"copy"},
                 "relationships":{"post":{"data":{"type":"posts","id":"1"}}}}]}"#,
    );
    let comments = post.borrow().comments.value().cloned().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].borrow().body, "first");
    assert!(Rc::ptr_eq(comments[0].borrow().post.as_ref().unwrap(), &post));
}

#[test]
fn repeated_primary_resource_resolves_to_one_node() {
    let data = deserialize(
        r#"{"data":[{"type":"users","id":"1","attributes":{"displayName":"a"}},
                    {"type":"users","id":"1","attributes":{"displayName":"b"}}]}"#,
    )
    .unwrap();
    let users = data.as_collection::<User>();
    assert_eq!(users.len(), 2);
    assert!(Rc::ptr_eq(&users[0], &users[1]));
    assert_eq!(users[0].borrow().display_name, "a");
}

#[test]
fn collection_data_yields_collection() {
    let data = deserialize(
        r#"{"data":[{"type":"users","id":"1"},{"type":"users","id":2,"attributes":{"displayName":"b"}}]}"#,
    )
    .unwrap();
    assert!(data.is_collection());
    let users = data.as_collection::<User>();
    assert_eq!(users.iter().map(|u| u.borrow().id).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(users[1].borrow().display_name, "b");
}

#[test]
fn null_data_yields_empty_single() {
    assert!(matches!(deserialize(r#"{"data":null}"#).unwrap(), ResourceData::Single(None)));
}

#[test]
fn unknown_attributes_and_included_types_are_ignored() {
    let post = single_post(
        r#"{"data":{"type":"posts","id":"1","attributes":{"title":"T","futureField":1,"titleLength":99}},
            "included":[{"type":"tags","id":"1"}]}"#,
    );
    assert_eq!(post.borrow().title, "T");
}

#[test]
fn unknown_primary_type_fails() {
    let err = deserialize(r#"{"data":{"type":"tags","id":"1"}}"#).unwrap_err();
    assert!(matches!(err, Error::UnknownResourceType(t) if t == "tags"));
}

#[test]
fn wrong_attribute_shape_is_a_conversion_error() {
    let err = deserialize(r#"{"data":{"type":"posts","id":"1","attributes":{"title":5}}}"#).unwrap_err();
    assert!(matches!(err, Error::Conversion { field, .. } if field == "Title"));

    let err = deserialize(r#"{"data":{"type":"posts","id":"1","attributes":{"views":1.5}}}"#).unwrap_err();
    assert!(matches!(err, Error::Conversion { field, .. } if field == "Views"));

    let err = deserialize(r#"{"data":{"type":"posts","id":"1","attributes":{"title":null}}}"#).unwrap_err();
    assert!(matches!(err, Error::Conversion { field, .. } if field == "Title"));
}

#[test]
fn non_numeric_id_for_integer_key_fails() {
    let err = deserialize(r#"{"data":{"type":"posts","id":"abc"}}"#).unwrap_err();
    assert!(matches!(err, Error::Conversion { field, .. } if field == "Id"));
}

#[test]
fn document_shape_errors() {
    assert!(matches!(
        deserialize(r#"{"meta":{}}"#).unwrap_err(),
        Error::Document(DocumentError::MissingData)
    ));
    assert!(matches!(
        deserialize(r#"{"data":{"type":"posts","id":"1","relationships":{"comments":{"data":{"type":"comments","id":"1"}}}}}"#)
            .unwrap_err(),
        Error::Document(DocumentError::CardinalityMismatch(_))
    ));
    assert!(matches!(deserialize("{").unwrap_err(), Error::Json(_)));
}
