use crate::store::{EntityStore, Result, StoreError};
use async_trait::async_trait;
use postboard_common::model::{
    Id,
    post::{NewPost, Post, PostChanges, PostMarker},
    user::{Email, NewUser, User, UserChanges, UserMarker},
};
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::debug;

/// [`EntityStore`] kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Id<UserMarker>, User>,
    posts: BTreeMap<Id<PostMarker>, Post>,
    last_user_id: u64,
    last_post_id: u64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The current time, nudged forward if the clock has not moved past `previous`.
fn timestamp_after(previous: OffsetDateTime) -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl Tables {
    fn email_taken(&self, email: &Email, except: Option<Id<UserMarker>>) -> bool {
        self.users
            .values()
            .any(|user| &user.email == email && Some(user.id) != except)
    }

    fn require_author(&self, author: Id<UserMarker>) -> Result<()> {
        if self.users.contains_key(&author) {
            Ok(())
        } else {
            Err(StoreError::MissingAuthor(author))
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail(user.email.clone()));
        }

        tables.last_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Id::new(tables.last_user_id),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_user(
        &self,
        user_id: Id<UserMarker>,
        changes: &UserChanges,
    ) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;

        if let Some(email) = &changes.email
            && tables.email_taken(email, Some(user_id))
        {
            return Err(StoreError::DuplicateEmail(email.clone()));
        }

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        changes.apply_to(user);
        user.updated_at = timestamp_after(user.updated_at);

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<bool> {
        let mut tables = self.tables.write().await;

        if tables.users.remove(&user_id).is_none() {
            return Ok(false);
        }

        let post_count = tables.posts.len();
        tables.posts.retain(|_, post| post.author != user_id);
        debug!(
            %user_id,
            deleted_posts = post_count - tables.posts.len(),
            "Deleted user and their posts"
        );

        Ok(true)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&post_id).cloned())
    }

    async fn fetch_user_posts(&self, user_id: Id<UserMarker>) -> Result<Option<Vec<Post>>> {
        let tables = self.tables.read().await;

        if !tables.users.contains_key(&user_id) {
            return Ok(None);
        }

        let posts = tables
            .posts
            .values()
            .filter(|post| post.author == user_id)
            .cloned()
            .collect();
        Ok(Some(posts))
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let mut tables = self.tables.write().await;

        tables.require_author(post.author)?;

        tables.last_post_id += 1;
        let now = OffsetDateTime::now_utc();
        let created = Post {
            id: Id::new(tables.last_post_id),
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author,
            published: post.published,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        changes: &PostChanges,
    ) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;

        if !tables.posts.contains_key(&post_id) {
            return Ok(None);
        }
        if let Some(author) = changes.author {
            tables.require_author(author)?;
        }

        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        changes.apply_to(post);
        post.updated_at = timestamp_after(post.updated_at);

        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        Ok(self.tables.write().await.posts.remove(&post_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        memory::MemoryStore,
        store::{EntityStore, StoreError},
    };
    use postboard_common::model::{
        Id,
        post::{NewPost, PostChanges},
        user::{Email, NewUser, UserChanges},
    };

    fn new_user(email: &str, first_name: &str) -> NewUser {
        NewUser {
            email: Email::new(email.to_owned()).unwrap(),
            first_name: first_name.to_owned(),
            last_name: "B".to_owned(),
            is_active: true,
        }
    }

    fn new_post(author: u64, title: &str) -> NewPost {
        NewPost {
            title: title.to_owned(),
            content: "C".to_owned(),
            author: Id::new(author),
            published: false,
        }
    }

    #[tokio::test]
    async fn ids_follow_insertion_order() {
        let store = MemoryStore::new();

        let first = store.create_user(&new_user("a@x.com", "A")).await.unwrap();
        let second = store.create_user(&new_user("b@x.com", "B")).await.unwrap();
        assert!(first.id < second.id);
        assert_eq!(first.created_at, first.updated_at);

        let listed: Vec<_> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.id)
            .collect();
        assert_eq!(listed, [first.id, second.id]);
    }

    #[tokio::test]
    async fn emails_are_unique() {
        let store = MemoryStore::new();
        let first = store.create_user(&new_user("a@x.com", "A")).await.unwrap();
        let second = store.create_user(&new_user("b@x.com", "B")).await.unwrap();

        assert!(matches!(
            store.create_user(&new_user("a@x.com", "C")).await,
            Err(StoreError::DuplicateEmail(_))
        ));

        let steal = UserChanges {
            email: Some(first.email.clone()),
            ..UserChanges::default()
        };
        assert!(matches!(
            store.update_user(second.id, &steal).await,
            Err(StoreError::DuplicateEmail(_))
        ));

        let keep = UserChanges {
            email: Some(first.email.clone()),
            first_name: Some("Z".to_owned()),
            ..UserChanges::default()
        };
        let updated = store.update_user(first.id, &keep).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Z");
    }

    #[tokio::test]
    async fn updates_refresh_updated_at() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("a@x.com", "A")).await.unwrap();

        let changes = UserChanges {
            is_active: Some(false),
            ..UserChanges::default()
        };
        let once = store.update_user(user.id, &changes).await.unwrap().unwrap();
        let twice = store.update_user(user.id, &changes).await.unwrap().unwrap();

        assert!(!once.is_active);
        assert_eq!(once.created_at, user.created_at);
        assert!(once.updated_at > user.updated_at);
        assert!(twice.updated_at > once.updated_at);
    }

    #[tokio::test]
    async fn missing_rows() {
        let store = MemoryStore::new();

        assert_eq!(store.fetch_user(Id::new(1)).await.unwrap(), None);
        assert_eq!(
            store
                .update_user(Id::new(1), &UserChanges::default())
                .await
                .unwrap(),
            None
        );
        assert!(!store.delete_user(Id::new(1)).await.unwrap());
        assert_eq!(store.fetch_user_posts(Id::new(1)).await.unwrap(), None);
        assert_eq!(store.fetch_post(Id::new(1)).await.unwrap(), None);
        assert!(!store.delete_post(Id::new(1)).await.unwrap());
    }

    #[tokio::test]
    async fn posts_need_an_existing_author() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.create_post(&new_post(1, "T")).await,
            Err(StoreError::MissingAuthor(author)) if author == Id::new(1)
        ));
        assert!(store.list_posts().await.unwrap().is_empty());

        let user = store.create_user(&new_user("a@x.com", "A")).await.unwrap();
        let post = store.create_post(&new_post(user.id.get(), "T")).await.unwrap();

        let reassign = PostChanges {
            author: Some(Id::new(99)),
            ..PostChanges::default()
        };
        assert!(matches!(
            store.update_post(post.id, &reassign).await,
            Err(StoreError::MissingAuthor(_))
        ));
        assert_eq!(store.fetch_post(post.id).await.unwrap(), Some(post));
    }

    #[tokio::test]
    async fn user_posts_and_cascade() {
        let store = MemoryStore::new();
        let alice = store.create_user(&new_user("a@x.com", "A")).await.unwrap();
        let bob = store.create_user(&new_user("b@x.com", "B")).await.unwrap();

        let first = store.create_post(&new_post(alice.id.get(), "1")).await.unwrap();
        let other = store.create_post(&new_post(bob.id.get(), "2")).await.unwrap();
        let second = store.create_post(&new_post(alice.id.get(), "3")).await.unwrap();

        assert_eq!(
            store.fetch_user_posts(alice.id).await.unwrap(),
            Some(vec![first, second])
        );

        assert!(store.delete_user(alice.id).await.unwrap());
        assert_eq!(store.list_posts().await.unwrap(), [other]);
        assert_eq!(
            store
                .fetch_user_posts(bob.id)
                .await
                .unwrap()
                .map(|posts| posts.len()),
            Some(1)
        );
    }
}
