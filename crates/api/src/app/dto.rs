//! Request/response DTOs.

use serde::Serialize;

use crate::app::errors::ApiError;
use crate::app::guards::{Fields, RequiredFields};

/// Body accepted by `POST /users` and `PUT /users/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub name: String,
}

impl RequiredFields for UserInput {
    const REQUIRED: &'static [&'static str] = &["name"];

    fn from_fields(mut fields: Fields) -> Result<Self, ApiError> {
        Ok(Self {
            name: fields.take("name")?,
        })
    }
}

/// Body accepted by `POST /users/:id/posts` and `PUT /posts/:id`.
///
/// No `user_id`: ownership always comes from the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostInput {
    pub text: String,
}

impl RequiredFields for PostInput {
    const REQUIRED: &'static [&'static str] = &["text"];

    fn from_fields(mut fields: Fields) -> Result<Self, ApiError> {
        Ok(Self {
            text: fields.take("text")?,
        })
    }
}

/// Confirmation body for deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
