use crate::server::{
    Result, ServerError, ServerRouter, Store,
    json::{Created, Json, Payload},
    routes::posts::render_posts,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use postboard_common::{
    model::{
        Id,
        user::{NewUser, UserChanges, UserMarker},
    },
    view::{WriteMode, WriteView, post::PostView, user::UserView},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_users)
        .typed_post(create_user)
        .typed_get(get_user)
        .typed_put(replace_user)
        .typed_patch(patch_user)
        .typed_delete(delete_user)
        .typed_get(get_user_posts)
}

#[derive(TypedPath)]
#[typed_path("/users")]
struct UsersPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct UserPath {
    id: Id<UserMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/posts", rejection(ServerError))]
struct UserPostsPath {
    id: Id<UserMarker>,
}

async fn list_users(
    UsersPath: UsersPath,
    State(store): State<Store>,
) -> Result<Json<Vec<UserView>>> {
    let users = store.list_users().await?;

    Ok(Json(users.iter().map(UserView::from).collect()))
}

async fn create_user(
    UsersPath: UsersPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Created<UserView>> {
    let new_user = NewUser::parse(payload, WriteMode::Create)?;
    let user = store.create_user(&new_user).await?;

    info!(user_id = %user.id, "Created user");
    Ok(Created(UserView::from(&user)))
}

async fn get_user(
    UserPath { id }: UserPath,
    State(store): State<Store>,
) -> Result<Json<UserView>> {
    let user = store
        .fetch_user(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(UserView::from(&user)))
}

async fn replace_user(
    UserPath { id }: UserPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Json<UserView>> {
    update_user(&store, id, payload, WriteMode::Replace).await
}

async fn patch_user(
    UserPath { id }: UserPath,
    State(store): State<Store>,
    Json(payload): Payload,
) -> Result<Json<UserView>> {
    update_user(&store, id, payload, WriteMode::Patch).await
}

async fn update_user(
    store: &Store,
    id: Id<UserMarker>,
    payload: Map<String, Value>,
    mode: WriteMode,
) -> Result<Json<UserView>> {
    store
        .fetch_user(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    let changes = UserChanges::parse(payload, mode)?;
    let user = store
        .update_user(id, &changes)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(UserView::from(&user)))
}

async fn delete_user(
    UserPath { id }: UserPath,
    State(store): State<Store>,
) -> Result<StatusCode> {
    if !store.delete_user(id).await? {
        return Err(ServerError::UserByIdNotFound(id));
    }

    info!(user_id = %id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_user_posts(
    UserPostsPath { id }: UserPostsPath,
    State(store): State<Store>,
) -> Result<Json<Vec<PostView>>> {
    let posts = store
        .fetch_user_posts(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(render_posts(&store, &posts).await?))
}
