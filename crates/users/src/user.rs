use serde::{Deserialize, Serialize};

use hubs_core::{error::is_present, DomainError, DomainResult, Entity, UserId};

/// A registered user.
///
/// Serialized as `{ "id": ..., "name": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
}

impl User {
    /// Rebuild a user from stored fields.
    ///
    /// Storage adapters are the only callers; new users go through [`NewUser`].
    pub fn restore(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace every mutable field with the values in `changes`.
    pub fn apply(&mut self, changes: &UserChanges) {
        self.name = changes.name.clone();
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a user. The name is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            name: required_name(name.into())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }
}

/// Whole-record replacement of a user's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    name: String,
}

impl UserChanges {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            name: required_name(name.into())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn required_name(name: String) -> DomainResult<String> {
    if !is_present(&name) {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name)
}
