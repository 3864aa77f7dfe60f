//! Blog fixture shared by the integration tests: users, posts and comments,
//! with a `Post.comments[i].post == post` back-reference.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use hypermedia::{shared, ContractBuilder, ContractResolver, Linked, Shared};

#[derive(Default)]
pub struct User {
    pub id: i32,
    pub display_name: String,
}

#[derive(Default)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub published: bool,
    pub rating: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub owner_user_id: Option<i32>,
    pub owner_user: Option<Shared<User>>,
    pub approver_id: Option<i32>,
    pub approver: Option<Shared<User>>,
    pub comments: Linked<Vec<Shared<Comment>>>,
}

#[derive(Default)]
pub struct Comment {
    pub id: i32,
    pub body: String,
    pub post_id: i32,
    pub post: Option<Shared<Post>>,
}

pub fn user(id: i32, display_name: &str) -> Shared<User> {
    shared(User {
        id,
        display_name: display_name.to_owned(),
    })
}

pub fn post(id: i32, title: &str) -> Shared<Post> {
    shared(Post {
        id,
        title: title.to_owned(),
        ..Post::default()
    })
}

/// A post whose comments all point back at it.
pub fn post_with_comments(id: i32, comment_ids: &[i32]) -> (Shared<Post>, Vec<Shared<Comment>>) {
    let post = post(id, "Cycles");
    let comments: Vec<Shared<Comment>> = comment_ids
        .iter()
        .map(|&cid| {
            shared(Comment {
                id: cid,
                body: format!("comment {cid}"),
                post_id: id,
                post: Some(post.clone()),
            })
        })
        .collect();
    post.borrow_mut().comments = Linked::Value(comments.clone());
    (post, comments)
}

pub fn blog_builder() -> ContractBuilder {
    let mut builder = ContractBuilder::new();

    builder
        .with::<User>("users")
        .id("Id", |u| u.id, |u, v| u.id = v)
        .attribute("DisplayName", |u| u.display_name.clone(), |u, v| u.display_name = v);

    let mut posts = builder.with::<Post>("posts");
    posts
        .id("Id", |p| p.id, |p, v| p.id = v)
        .attribute("Title", |p| p.title.clone(), |p, v| p.title = v)
        .attribute("Subtitle", |p| p.subtitle.clone(), |p, v| p.subtitle = v)
        .attribute("Published", |p| p.published, |p, v| p.published = v)
        .attribute("Rating", |p| p.rating, |p, v| p.rating = v)
        .attribute("Views", |p| p.views, |p, v| p.views = v)
        .attribute("CreatedAt", |p| p.created_at, |p, v| p.created_at = v)
        .member("OwnerUserId", |p| p.owner_user_id, |p, v| p.owner_user_id = v)
        .member("ApproverId", |p| p.approver_id, |p, v| p.approver_id = v)
        .calculated("TitleLength", |p| p.title.chars().count() as i32)
        .link("/v1/posts/{id}", "id", |p| p.id);
    posts
        .belongs_to(
            "OwnerUser",
            |p| p.owner_user.clone(),
            |p, v: Option<Shared<User>>| p.owner_user = v,
        )
        .backing_field("OwnerUserId")
        .template("/v1/users/{id}", "id", |p| p.owner_user_id);
    posts
        .belongs_to_if(
            "Approver",
            |p| p.approver.clone(),
            |p, v: Option<Shared<User>>| p.approver = v,
            |p| p.published,
        )
        .backing_field("ApproverId");
    posts
        .has_many(
            "Comments",
            |p| p.comments.clone(),
            |p, v: Option<Vec<Shared<Comment>>>| p.comments = Linked::from(v),
        )
        .inverse("Post")
        .template("/v1/posts/{id}/comments", "id", |p| p.id);

    let mut comments = builder.with::<Comment>("comments");
    comments
        .id("Id", |c| c.id, |c, v| c.id = v)
        .attribute("Body", |c| c.body.clone(), |c, v| c.body = v)
        .member("PostId", |c| c.post_id, |c, v| c.post_id = v);
    comments
        .belongs_to("Post", |c| c.post.clone(), |c, v: Option<Shared<Post>>| c.post = v)
        .backing_field("PostId")
        .inverse("Comments");

    builder
}

pub fn blog() -> ContractResolver {
    blog_builder().build().expect("blog contracts are valid")
}
