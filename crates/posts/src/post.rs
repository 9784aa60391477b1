use serde::{Deserialize, Serialize};

use hubs_core::{error::is_present, DomainError, DomainResult, Entity, PostId, UserId};

/// A post written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    id: PostId,
    user_id: UserId,
    text: String,
}

impl Post {
    /// Rebuild a post from stored fields.
    pub fn restore(id: PostId, user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            id,
            user_id,
            text: text.into(),
        }
    }

    pub fn id_typed(&self) -> PostId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the post's text. Ownership (`user_id`) never changes.
    pub fn apply(&mut self, changes: &PostChanges) {
        self.text = changes.text.clone();
    }
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a post. The text is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    user_id: UserId,
    text: String,
}

impl NewPost {
    pub fn new(user_id: UserId, text: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            user_id,
            text: required_text(text.into())?,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Whole-record replacement of a post's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    text: String,
}

impl PostChanges {
    pub fn new(text: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            text: required_text(text.into())?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn required_text(text: String) -> DomainResult<String> {
    if !is_present(&text) {
        return Err(DomainError::validation("text cannot be empty"));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_post_rejects_empty_text() {
        let user_id = UserId::new();
        assert!(NewPost::new(user_id, "").is_err());
        assert!(NewPost::new(user_id, "\n").is_err());
    }

    #[test]
    fn apply_keeps_owner() {
        let owner = UserId::new();
        let mut post = Post::restore(PostId::new(), owner, "first");
        post.apply(&PostChanges::new("second").unwrap());
        assert_eq!(post.text(), "second");
        assert_eq!(post.user_id(), owner);
    }

    #[test]
    fn serializes_with_user_id() {
        let id = PostId::new();
        let owner = UserId::new();
        let json = serde_json::to_value(Post::restore(id, owner, "hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": id.to_string(), "user_id": owner.to_string(), "text": "hello" })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a stored post always carries the owner it was created for.
        #[test]
        fn new_post_keeps_owner(text in "[a-z][a-z ]{0,40}") {
            let owner = UserId::new();
            let new = NewPost::new(owner, text).unwrap();
            prop_assert_eq!(new.user_id(), owner);
        }
    }
}
