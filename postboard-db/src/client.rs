use crate::{
    record::{POST_COLUMNS, PostRecord, USER_COLUMNS, UserRecord},
    store::{EntityStore, Result, StoreError},
};
use async_trait::async_trait;
use postboard_common::model::{
    Id,
    post::{NewPost, Post, PostChanges, PostMarker},
    user::{NewUser, User, UserChanges, UserMarker},
};
use sqlx::{PgPool, postgres::PgPoolOptions, query, query_as, query_scalar};
use tracing::debug;

const USERS_EMAIL_KEY: &str = "users_email_key";
const POSTS_USER_ID_FKEY: &str = "posts_user_id_fkey";

/// Postgres-backed [`EntityStore`].
#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        debug!("Database migrations applied");
        Ok(())
    }
}

fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

#[async_trait]
impl EntityStore for DbClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        let records = query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users.users ORDER BY user_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users.users WHERE user_id = $1"
        ))
        .bind(user_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let record = query_as::<_, UserRecord>(&format!(
            "
            INSERT INTO users.users (email, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.email.get())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match violated_constraint(&err) {
            Some(USERS_EMAIL_KEY) => StoreError::DuplicateEmail(user.email.clone()),
            _ => err.into(),
        })?;

        Ok(record.try_into()?)
    }

    async fn update_user(
        &self,
        user_id: Id<UserMarker>,
        changes: &UserChanges,
    ) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(&format!(
            "
            UPDATE users.users
            SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                is_active = COALESCE($5, is_active),
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user_id.get().cast_signed())
        .bind(changes.email.as_ref().map(|email| email.get()))
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| match (violated_constraint(&err), &changes.email) {
            (Some(USERS_EMAIL_KEY), Some(email)) => StoreError::DuplicateEmail(email.clone()),
            _ => err.into(),
        })?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<bool> {
        let result = query("DELETE FROM users.users WHERE user_id = $1")
            .bind(user_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let records = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts.posts ORDER BY post_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Post::from).collect())
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts.posts WHERE post_id = $1"
        ))
        .bind(post_id.get().cast_signed())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Post::from))
    }

    async fn fetch_user_posts(&self, user_id: Id<UserMarker>) -> Result<Option<Vec<Post>>> {
        let user_exists = query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users.users WHERE user_id = $1)",
        )
        .bind(user_id.get().cast_signed())
        .fetch_one(&self.pool)
        .await?;

        if !user_exists {
            return Ok(None);
        }

        let records = query_as::<_, PostRecord>(&format!(
            "SELECT {POST_COLUMNS} FROM posts.posts WHERE user_id = $1 ORDER BY post_id"
        ))
        .bind(user_id.get().cast_signed())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(records.into_iter().map(Post::from).collect()))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let record = query_as::<_, PostRecord>(&format!(
            "
            INSERT INTO posts.posts (title, content, user_id, published)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author.get().cast_signed())
        .bind(post.published)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match violated_constraint(&err) {
            Some(POSTS_USER_ID_FKEY) => StoreError::MissingAuthor(post.author),
            _ => err.into(),
        })?;

        Ok(record.into())
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        changes: &PostChanges,
    ) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(&format!(
            "
            UPDATE posts.posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                user_id = COALESCE($4, user_id),
                published = COALESCE($5, published),
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE post_id = $1
            RETURNING {POST_COLUMNS}
            "
        ))
        .bind(post_id.get().cast_signed())
        .bind(changes.title.as_deref())
        .bind(changes.content.as_deref())
        .bind(changes.author.map(|author| author.get().cast_signed()))
        .bind(changes.published)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| match (violated_constraint(&err), changes.author) {
            (Some(POSTS_USER_ID_FKEY), Some(author)) => StoreError::MissingAuthor(author),
            _ => err.into(),
        })?;

        Ok(record.map(Post::from))
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        let result = query("DELETE FROM posts.posts WHERE post_id = $1")
            .bind(post_id.get().cast_signed())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
