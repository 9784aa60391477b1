use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use hubs_core::{PostId, UserId};
use hubs_posts::{NewPost, Post, PostChanges};
use hubs_users::{NewUser, User, UserChanges};

use super::{PostStore, StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

/// In-memory store for users and posts.
///
/// Intended for tests/dev. Rows are kept in insertion order and looked up by
/// linear scan.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let user = User::restore(UserId::new(), user.into_name());
        self.write()?.users.push(user.clone());
        Ok(user)
    }

    async fn get(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    async fn get_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.id_typed() == id)
            .cloned())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> StoreResult<u64> {
        let mut tables = self.write()?;
        match tables.users.iter_mut().find(|u| u.id_typed() == id) {
            Some(user) => {
                user.apply(&changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: UserId) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.id_typed() != id);
        let removed = (before - tables.users.len()) as u64;
        if removed > 0 {
            tables.posts.retain(|p| p.user_id() != id);
        }
        Ok(removed)
    }

    async fn get_user_posts(&self, id: UserId) -> StoreResult<Vec<Post>> {
        Ok(self
            .read()?
            .posts
            .iter()
            .filter(|p| p.user_id() == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn insert(&self, post: NewPost) -> StoreResult<Post> {
        let mut tables = self.write()?;
        // Same guarantee a foreign key gives the relational backend.
        if !tables.users.iter().any(|u| u.id_typed() == post.user_id()) {
            return Err(StoreError::Backend(format!(
                "post references unknown user {}",
                post.user_id()
            )));
        }
        let post = Post::restore(PostId::new(), post.user_id(), post.text());
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn get(&self) -> StoreResult<Vec<Post>> {
        Ok(self.read()?.posts.clone())
    }

    async fn get_by_id(&self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self
            .read()?
            .posts
            .iter()
            .find(|p| p.id_typed() == id)
            .cloned())
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> StoreResult<u64> {
        let mut tables = self.write()?;
        match tables.posts.iter_mut().find(|p| p.id_typed() == id) {
            Some(post) => {
                post.apply(&changes);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: PostId) -> StoreResult<u64> {
        let mut tables = self.write()?;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id_typed() != id);
        Ok((before - tables.posts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &InMemoryStore, name: &str) -> User {
        UserStore::insert(store, NewUser::new(name).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_keeps_order() {
        let store = InMemoryStore::new();
        let a = seed_user(&store, "Asha").await;
        let b = seed_user(&store, "Frodo").await;
        assert_ne!(a.id_typed(), b.id_typed());

        let all = UserStore::get(&store).await.unwrap();
        assert_eq!(all, vec![a.clone(), b]);

        let found = UserStore::get_by_id(&store, a.id_typed()).await.unwrap();
        assert_eq!(found, Some(a));
    }

    #[tokio::test]
    async fn unknown_user_lookup_is_none_not_error() {
        let store = InMemoryStore::new();
        let found = UserStore::get_by_id(&store, UserId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_reports_affected_count() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "Asha").await;

        let changes = UserChanges::new("Sam").unwrap();
        assert_eq!(UserStore::update(&store, user.id_typed(), changes.clone()).await.unwrap(), 1);
        assert_eq!(UserStore::update(&store, UserId::new(), changes).await.unwrap(), 0);

        let reloaded = UserStore::get_by_id(&store, user.id_typed()).await.unwrap().unwrap();
        assert_eq!(reloaded.name(), "Sam");
    }

    #[tokio::test]
    async fn user_posts_are_scoped_to_owner() {
        let store = InMemoryStore::new();
        let asha = seed_user(&store, "Asha").await;
        let frodo = seed_user(&store, "Frodo").await;

        let p1 = PostStore::insert(&store, NewPost::new(asha.id_typed(), "one").unwrap())
            .await
            .unwrap();
        PostStore::insert(&store, NewPost::new(frodo.id_typed(), "two").unwrap())
            .await
            .unwrap();

        let posts = store.get_user_posts(asha.id_typed()).await.unwrap();
        assert_eq!(posts, vec![p1]);
    }

    #[tokio::test]
    async fn removing_a_user_cascades_to_posts() {
        let store = InMemoryStore::new();
        let asha = seed_user(&store, "Asha").await;
        let post = PostStore::insert(&store, NewPost::new(asha.id_typed(), "hello").unwrap())
            .await
            .unwrap();

        assert_eq!(UserStore::remove(&store, asha.id_typed()).await.unwrap(), 1);
        assert_eq!(UserStore::remove(&store, asha.id_typed()).await.unwrap(), 0);
        assert!(PostStore::get_by_id(&store, post.id_typed()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn post_for_unknown_user_is_rejected() {
        let store = InMemoryStore::new();
        let err = PostStore::insert(&store, NewPost::new(UserId::new(), "orphan").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn post_update_and_remove() {
        let store = InMemoryStore::new();
        let asha = seed_user(&store, "Asha").await;
        let post = PostStore::insert(&store, NewPost::new(asha.id_typed(), "draft").unwrap())
            .await
            .unwrap();

        let changes = PostChanges::new("final").unwrap();
        assert_eq!(PostStore::update(&store, post.id_typed(), changes).await.unwrap(), 1);
        let reloaded = PostStore::get_by_id(&store, post.id_typed()).await.unwrap().unwrap();
        assert_eq!(reloaded.text(), "final");
        assert_eq!(reloaded.user_id(), asha.id_typed());

        assert_eq!(PostStore::remove(&store, post.id_typed()).await.unwrap(), 1);
        assert!(PostStore::get(&store).await.unwrap().is_empty());
    }
}
