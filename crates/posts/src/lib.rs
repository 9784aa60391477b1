//! Posts domain module.
//!
//! A post belongs to exactly one user through `user_id`.

pub mod post;

pub use post::{NewPost, Post, PostChanges};
