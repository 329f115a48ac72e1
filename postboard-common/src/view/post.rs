use crate::{
    model::{
        Id,
        post::{NewPost, Post, PostChanges, PostMarker, TITLE_MAX_LEN},
        user::{User, UserMarker},
    },
    view::{FieldReader, ViewKind, WriteView},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct PostView {
    pub id: Id<PostMarker>,
    pub title: String,
    pub content: String,
    pub author: Id<UserMarker>,
    /// The author's first name at read time.
    pub author_name: String,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A stored post whose author no longer resolves.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
#[error("Post {post} references user {author}, which does not exist")]
pub struct DanglingAuthorError {
    pub post: Id<PostMarker>,
    pub author: Id<UserMarker>,
}

impl PostView {
    /// Renders `post` with `author` as the resolved `post.author`.
    pub fn render(post: &Post, author: Option<&User>) -> Result<Self, DanglingAuthorError> {
        let author = author
            .filter(|author| author.id == post.author)
            .ok_or(DanglingAuthorError {
                post: post.id,
                author: post.author,
            })?;

        Ok(Self {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            author: post.author,
            author_name: author.first_name.clone(),
            published: post.published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}

impl WriteView for NewPost {
    const KIND: ViewKind = ViewKind::PostCreate;

    fn read(reader: &mut FieldReader) -> Option<Self> {
        let title = reader.text("title", Some(TITLE_MAX_LEN));
        let content = reader.text("content", None);
        let author = reader.required("author");
        let published = reader.defaulted("published");

        Some(Self {
            title: title?,
            content: content?,
            author: author?,
            published: published.unwrap_or(false),
        })
    }
}

impl WriteView for PostChanges {
    const KIND: ViewKind = ViewKind::Post;

    fn read(reader: &mut FieldReader) -> Option<Self> {
        Some(Self {
            title: reader.text("title", Some(TITLE_MAX_LEN)),
            content: reader.text("content", None),
            author: reader.required("author"),
            published: reader.defaulted("published"),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            post::{NewPost, Post, PostChanges},
            user::{Email, User},
        },
        view::{
            ViewKind, WriteMode, WriteView,
            post::{DanglingAuthorError, PostView},
        },
    };
    use serde_json::{Map, Value, json};
    use time::macros::datetime;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn author() -> User {
        User {
            id: Id::new(1),
            email: Email::new("a@x.com".to_owned()).unwrap(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            is_active: true,
            created_at: datetime!(2025-10-24 10:00 UTC),
            updated_at: datetime!(2025-10-24 10:00 UTC),
        }
    }

    fn post() -> Post {
        Post {
            id: Id::new(7),
            title: "T".to_owned(),
            content: "C".to_owned(),
            author: Id::new(1),
            published: false,
            created_at: datetime!(2025-10-24 11:00 UTC),
            updated_at: datetime!(2025-10-24 11:00 UTC),
        }
    }

    #[test]
    fn renders_author_name() {
        let rendered = serde_json::to_value(PostView::render(&post(), Some(&author())).unwrap())
            .unwrap();

        assert_eq!(
            rendered,
            json!({
                "id": 7,
                "title": "T",
                "content": "C",
                "author": 1,
                "author_name": "A",
                "published": false,
                "created_at": "2025-10-24T11:00:00Z",
                "updated_at": "2025-10-24T11:00:00Z",
            })
        );
        assert_eq!(
            rendered.as_object().unwrap().len(),
            ViewKind::Post.readable().len()
        );
    }

    #[test]
    fn unresolved_author_is_a_fault() {
        let expected = DanglingAuthorError {
            post: Id::new(7),
            author: Id::new(1),
        };

        assert_eq!(PostView::render(&post(), None), Err(expected));

        let stranger = User {
            id: Id::new(2),
            ..author()
        };
        assert_eq!(PostView::render(&post(), Some(&stranger)), Err(expected));
    }

    #[test]
    fn create_accepts_only_the_creation_fields() {
        let payload = object(json!({
            "id": 50,
            "title": "T",
            "content": "C",
            "author": 1,
            "author_name": "Mallory",
            "updated_at": "2000-01-01T00:00:00Z",
        }));

        let new_post = NewPost::parse(payload, WriteMode::Create).unwrap();
        assert_eq!(
            new_post,
            NewPost {
                title: "T".to_owned(),
                content: "C".to_owned(),
                author: Id::new(1),
                published: false,
            }
        );
    }

    #[test]
    fn create_rejects_malformed_author() {
        let payload = object(json!({ "title": "T", "content": "C", "author": "one" }));

        let errors = NewPost::parse(payload, WriteMode::Create).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["author"]);
    }

    #[test]
    fn patch_can_move_a_post_to_another_author() {
        let payload = object(json!({ "author": 2, "published": true }));
        let changes = PostChanges::parse(payload, WriteMode::Patch).unwrap();

        let mut patched = post();
        changes.apply_to(&mut patched);
        assert_eq!(patched.author, Id::new(2));
        assert!(patched.published);
        assert_eq!(patched.title, "T");
    }

    #[test]
    fn replace_requires_title_content_and_author() {
        let errors = PostChanges::parse(Map::new(), WriteMode::Replace).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["author", "content", "title"]
        );
    }
}
