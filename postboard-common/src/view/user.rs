use crate::{
    model::{
        Id,
        user::{Email, NAME_MAX_LEN, NewUser, User, UserChanges, UserMarker},
    },
    view::{FieldReader, ViewKind, WriteView},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct UserView {
    pub id: Id<UserMarker>,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl WriteView for NewUser {
    const KIND: ViewKind = ViewKind::User;

    fn read(reader: &mut FieldReader) -> Option<Self> {
        let email = reader.required("email");
        let first_name = reader.text("first_name", Some(NAME_MAX_LEN));
        let last_name = reader.text("last_name", Some(NAME_MAX_LEN));
        let is_active = reader.defaulted("is_active");

        Some(Self {
            email: email?,
            first_name: first_name?,
            last_name: last_name?,
            is_active: is_active.unwrap_or(true),
        })
    }
}

impl WriteView for UserChanges {
    const KIND: ViewKind = ViewKind::User;

    fn read(reader: &mut FieldReader) -> Option<Self> {
        Some(Self {
            email: reader.required("email"),
            first_name: reader.text("first_name", Some(NAME_MAX_LEN)),
            last_name: reader.text("last_name", Some(NAME_MAX_LEN)),
            is_active: reader.defaulted("is_active"),
        })
    }
}
