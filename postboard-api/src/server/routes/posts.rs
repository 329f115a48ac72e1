use crate::server::{
    Result, ServerError, ServerRouter, Store,
    json::{Created, Json, Payload},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use postboard_common::{
    model::{
        Id,
        post::{NewPost, Post, PostChanges, PostMarker},
        user::{User, UserMarker},
    },
    view::{WriteMode, WriteView, post::PostView},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(replace_post)
        .typed_patch(patch_post)
        .typed_delete(delete_post)
}

#[derive(TypedPath)]
#[typed_path("/posts")]
struct PostsPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn resolve_author(store: &Store, author: Id<UserMarker>) -> Result<User> {
    store
        .fetch_user(author)
        .await?
        .ok_or_else(|| ServerError::missing_author(author))
}

async fn render_post(store: &Store, post: &Post) -> Result<PostView> {
    let author = store.fetch_user(post.author).await?;

    Ok(PostView::render(post, author.as_ref())?)
}

/// Renders `posts` in order, looking every distinct author up once.
pub(super) async fn render_posts(store: &Store, posts: &[Post]) -> Result<Vec<PostView>> {
    let mut authors = HashMap::new();
    let mut views = Vec::with_capacity(posts.len());

    for post in posts {
        if !authors.contains_key(&post.author) {
            authors.insert(post.author, store.fetch_user(post.author).await?);
        }
        let author = authors.get(&post.author).and_then(Option::as_ref);
        views.push(PostView::render(post, author)?);
    }

    Ok(views)
}

async fn list_posts(
    PostsPath: PostsPath,
    State(store): State<Store>,
) -> Result<Json<Vec<PostView>>> {
    let posts = store.list_posts().await?;

    Ok(Json(render_posts(&store, &posts).await?))
}

async fn create_post(
    PostsPath: PostsPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Created<PostView>> {
    let new_post = NewPost::parse(payload, WriteMode::Create)?;
    let author = resolve_author(&store, new_post.author).await?;
    let post = store.create_post(&new_post).await?;

    info!(post_id = %post.id, author_id = %post.author, "Created post");
    Ok(Created(PostView::render(&post, Some(&author))?))
}

async fn get_post(
    PostPath { id }: PostPath,
    State(store): State<Store>,
) -> Result<Json<PostView>> {
    let post = store
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(render_post(&store, &post).await?))
}

async fn replace_post(
    PostPath { id }: PostPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Json<PostView>> {
    update_post(&store, id, payload, WriteMode::Replace).await
}

async fn patch_post(
    PostPath { id }: PostPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Json<PostView>> {
    update_post(&store, id, payload, WriteMode::Patch).await
}

async fn update_post(
    store: &Store,
    id: Id<PostMarker>,
    payload: Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<PostView>> {
    store
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    let changes = PostChanges::parse(payload, mode)?;
    if let Some(author) = changes.author {
        resolve_author(store, author).await?;
    }

    let post = store
        .update_post(id, &changes)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(render_post(store, &post).await?))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(store): State<Store>,
) -> Result<StatusCode> {
    if !store.delete_post(id).await? {
        return Err(ServerError::PostByIdNotFound(id));
    }

    info!(post_id = %id, "Deleted post");
    Ok(StatusCode::NO_CONTENT)
}
