use postboard_common::model::{
    ModelValidationError,
    post::Post,
    user::{Email, User},
};
use sqlx::FromRow;
use time::OffsetDateTime;

pub(crate) const USER_COLUMNS: &str =
    "user_id, email, first_name, last_name, is_active, created_at, updated_at";
pub(crate) const POST_COLUMNS: &str =
    "post_id, title, content, user_id, published, created_at, updated_at";

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.cast_unsigned().into(),
            email: Email::new(value.email)?,
            first_name: value.first_name,
            last_name: value.last_name,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl From<PostRecord> for Post {
    fn from(value: PostRecord) -> Self {
        Self {
            id: value.post_id.cast_unsigned().into(),
            title: value.title,
            content: value.content,
            author: value.user_id.cast_unsigned().into(),
            published: value.published,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::record::{PostRecord, UserRecord};
    use postboard_common::model::{
        Id, ModelValidationError,
        post::Post,
        user::{InvalidEmailError, User},
    };
    use time::macros::datetime;

    fn user_record() -> UserRecord {
        UserRecord {
            user_id: 4,
            email: "a@x.com".to_owned(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            is_active: true,
            created_at: datetime!(2025-10-24 10:00 UTC),
            updated_at: datetime!(2025-10-24 10:00 UTC),
        }
    }

    #[test]
    fn user_record_conversion() {
        let user = User::try_from(user_record()).unwrap();
        assert_eq!(user.id, Id::new(4));
        assert_eq!(user.email.get(), "a@x.com");

        let broken = UserRecord {
            email: "broken".to_owned(),
            ..user_record()
        };
        assert_eq!(
            User::try_from(broken),
            Err(ModelValidationError::Email(InvalidEmailError::Malformed(
                "broken".to_owned()
            )))
        );
    }

    #[test]
    fn post_record_conversion() {
        let post = Post::from(PostRecord {
            post_id: 9,
            title: "T".to_owned(),
            content: "C".to_owned(),
            user_id: 4,
            published: true,
            created_at: datetime!(2025-10-24 10:00 UTC),
            updated_at: datetime!(2025-10-24 10:05 UTC),
        });

        assert_eq!(post.id, Id::new(9));
        assert_eq!(post.author, Id::new(4));
        assert!(post.published);
    }
}
