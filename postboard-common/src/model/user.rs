use crate::model::Id;
use serde::{Deserialize, Deserializer, Serialize, de::Error};
use thiserror::Error;
use time::OffsetDateTime;

pub const EMAIL_MAX_LEN: usize = 254;
pub const NAME_MAX_LEN: usize = 150;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct User {
    pub id: Id<UserMarker>,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Everything a client may supply when creating a user.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NewUser {
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

/// Writable user fields to overwrite; `None` keeps the stored value.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct UserChanges {
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            user.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            user.last_name.clone_from(last_name);
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum InvalidEmailError {
    #[error("Enter a valid email address.")]
    Malformed(String),
    #[error("Ensure this field has no more than {max} characters.", max = EMAIL_MAX_LEN)]
    TooLong(String),
}

impl Email {
    /// Accepts `local@domain` where neither part is empty, the domain has a dot
    /// and nothing contains whitespace.
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        if email.chars().count() > EMAIL_MAX_LEN {
            return Err(InvalidEmailError::TooLong(email));
        }

        let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }) && !email.chars().any(char::is_whitespace);

        if well_formed {
            Ok(Email(email))
        } else {
            Err(InvalidEmailError::Malformed(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Email::new(inner).map_err(Error::custom)
    }
}
