//! Wire representations of users and posts.
//!
//! Every operation names the view it parses its body with and the view it
//! renders its result with. [`ViewKind::for_action`] is the single table that
//! records this pairing.

pub mod post;
pub mod user;

mod reader;

pub use reader::{FieldReader, NON_FIELD_ERRORS, ValidationErrors, WriteMode};

use serde_json::{Map, Value};

const USER_READABLE: &[&str] = &[
    "id",
    "email",
    "first_name",
    "last_name",
    "is_active",
    "created_at",
    "updated_at",
];
const USER_WRITABLE: &[&str] = &["email", "first_name", "last_name", "is_active"];

const POST_READABLE: &[&str] = &[
    "id",
    "title",
    "content",
    "author",
    "author_name",
    "published",
    "created_at",
    "updated_at",
];
const POST_WRITABLE: &[&str] = &["title", "content", "author", "published"];

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ViewKind {
    User,
    Post,
    /// Write-only view accepted when creating a post.
    PostCreate,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Resource {
    Users,
    Posts,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
    /// `/users/{id}/posts`
    UserPosts,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct ActionViews {
    pub input: Option<ViewKind>,
    pub output: Option<ViewKind>,
}

impl ViewKind {
    /// Fields present in a rendered object, in wire order.
    #[must_use]
    pub fn readable(self) -> &'static [&'static str] {
        match self {
            ViewKind::User => USER_READABLE,
            ViewKind::Post => POST_READABLE,
            ViewKind::PostCreate => &[],
        }
    }

    /// Fields a client may set through this view.
    #[must_use]
    pub fn writable(self) -> &'static [&'static str] {
        match self {
            ViewKind::User => USER_WRITABLE,
            ViewKind::Post | ViewKind::PostCreate => POST_WRITABLE,
        }
    }

    /// The views an action parses and renders with, or `None` if the resource
    /// has no such action.
    #[must_use]
    pub fn for_action(resource: Resource, action: Action) -> Option<ActionViews> {
        let (input, output) = match (resource, action) {
            (Resource::Users, Action::List | Action::Retrieve) => (None, Some(ViewKind::User)),
            (Resource::Users, Action::Create | Action::Update | Action::PartialUpdate) => {
                (Some(ViewKind::User), Some(ViewKind::User))
            }
            (Resource::Users, Action::UserPosts) => (None, Some(ViewKind::Post)),
            (Resource::Posts, Action::List | Action::Retrieve) => (None, Some(ViewKind::Post)),
            (Resource::Posts, Action::Create) => (Some(ViewKind::PostCreate), Some(ViewKind::Post)),
            (Resource::Posts, Action::Update | Action::PartialUpdate) => {
                (Some(ViewKind::Post), Some(ViewKind::Post))
            }
            (_, Action::Destroy) => (None, None),
            (Resource::Posts, Action::UserPosts) => return None,
        };

        Some(ActionViews { input, output })
    }
}

/// A typed write set parsed through one view.
pub trait WriteView: Sized {
    const KIND: ViewKind;

    /// Reads the fields of this view. Returns `None` if any field was rejected,
    /// in which case the reader holds the reason.
    fn read(reader: &mut FieldReader) -> Option<Self>;

    fn parse(payload: Map<String, Value>, mode: WriteMode) -> Result<Self, ValidationErrors> {
        let mut reader = FieldReader::new(Self::KIND, mode, payload);
        let parsed = Self::read(&mut reader);
        reader.finish(parsed)
    }
}

#[cfg(test)]
mod tests {
    use crate::view::{Action, ActionViews, Resource, ViewKind};

    #[test]
    fn post_create_is_the_only_asymmetric_action() {
        let resources = [Resource::Users, Resource::Posts];
        let actions = [
            Action::List,
            Action::Create,
            Action::Retrieve,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
            Action::UserPosts,
        ];

        for resource in resources {
            for action in actions {
                let Some(ActionViews { input, output }) = ViewKind::for_action(resource, action)
                else {
                    continue;
                };
                if let (Some(input), Some(output)) = (input, output)
                    && input != output
                {
                    assert_eq!((resource, action), (Resource::Posts, Action::Create));
                    assert_eq!((input, output), (ViewKind::PostCreate, ViewKind::Post));
                }
            }
        }
    }

    #[test]
    fn user_posts_only_exists_on_users() {
        assert_eq!(
            ViewKind::for_action(Resource::Users, Action::UserPosts),
            Some(ActionViews {
                input: None,
                output: Some(ViewKind::Post)
            })
        );
        assert_eq!(ViewKind::for_action(Resource::Posts, Action::UserPosts), None);
    }

    #[test]
    fn writable_fields_are_never_read_only() {
        for kind in [ViewKind::User, ViewKind::Post, ViewKind::PostCreate] {
            for field in kind.writable() {
                assert!(
                    !["id", "created_at", "updated_at", "author_name"].contains(field),
                    "{kind:?} exposes {field} for writing"
                );
            }
        }
    }

    #[test]
    fn post_create_is_never_rendered() {
        assert!(ViewKind::PostCreate.readable().is_empty());
        assert_eq!(ViewKind::PostCreate.writable(), ViewKind::Post.writable());
    }
}
