//! Routing table.
//!
//! | Path                | Verb   | Operation                 |
//! |---------------------|--------|---------------------------|
//! | `/users`            | GET    | list users                |
//! | `/users`            | POST   | create user               |
//! | `/users/{id}`       | GET    | retrieve user             |
//! | `/users/{id}`       | PUT    | replace user              |
//! | `/users/{id}`       | PATCH  | partially update user     |
//! | `/users/{id}`       | DELETE | delete user and its posts |
//! | `/users/{id}/posts` | GET    | list posts by user        |
//! | `/posts`            | GET    | list posts                |
//! | `/posts`            | POST   | create post               |
//! | `/posts/{id}`       | GET    | retrieve post             |
//! | `/posts/{id}`       | PUT    | replace post              |
//! | `/posts/{id}`       | PATCH  | partially update post     |
//! | `/posts/{id}`       | DELETE | delete post               |

use crate::server::ServerRouter;

mod posts;
mod users;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(users::routes())
        .merge(posts::routes())
}
