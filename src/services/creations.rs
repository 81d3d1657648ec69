use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    database::{queries::CreationQueries, Database},
    errors::{AppError, Result},
    models::{Creation, NewCreation},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CreationStore: Send + Sync {
    async fn insert(&self, creation: NewCreation) -> Result<Creation>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Creation>>;

    async fn list_published(&self) -> Result<Vec<Creation>>;

    /// Flips `user_id`'s membership in the like set of a creation visible to
    /// them. `None` when no such creation exists.
    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>>;

    /// Flips `publish` on a creation owned by `user_id`.
    async fn toggle_publish(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>>;

    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct PgCreationStore {
    database: Database,
}

impl PgCreationStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl CreationStore for PgCreationStore {
    async fn insert(&self, creation: NewCreation) -> Result<Creation> {
        CreationQueries::insert(self.database.pool(), &creation).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Creation>> {
        CreationQueries::list_by_user(self.database.pool(), user_id).await
    }

    async fn list_published(&self) -> Result<Vec<Creation>> {
        CreationQueries::list_published(self.database.pool()).await
    }

    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        CreationQueries::toggle_like(self.database.pool(), id, user_id).await
    }

    async fn toggle_publish(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        CreationQueries::toggle_publish(self.database.pool(), id, user_id).await
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.database.pool()).await?;
        Ok(())
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryCreationStore {
    creations: Mutex<Vec<Creation>>,
}

impl MemoryCreationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Creation> {
        self.creations
            .lock()
            .map(|creations| creations.clone())
            .unwrap_or_default()
    }

    fn with_creations<T>(&self, f: impl FnOnce(&mut Vec<Creation>) -> T) -> Result<T> {
        let mut creations = self
            .creations
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("creation store lock poisoned")))?;
        Ok(f(&mut creations))
    }
}

fn newest_first(mut creations: Vec<Creation>) -> Vec<Creation> {
    creations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    creations
}

#[async_trait]
impl CreationStore for MemoryCreationStore {
    async fn insert(&self, creation: NewCreation) -> Result<Creation> {
        let now = Utc::now();
        let created = Creation {
            id: Uuid::new_v4(),
            user_id: creation.user_id,
            prompt: creation.prompt,
            content: creation.content,
            creation_type: creation.creation_type,
            publish: creation.publish,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.with_creations(|creations| {
            creations.push(created.clone());
            created
        })
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Creation>> {
        let owned: Vec<Creation> = self.with_creations(|creations| {
            creations
                .iter()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect()
        })?;
        Ok(newest_first(owned))
    }

    async fn list_published(&self) -> Result<Vec<Creation>> {
        let published: Vec<Creation> = self.with_creations(|creations| {
            creations.iter().filter(|c| c.publish).cloned().collect()
        })?;
        Ok(newest_first(published))
    }

    async fn toggle_like(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        self.with_creations(|creations: &mut Vec<Creation>| -> Option<Creation> {
            let creation = creations
                .iter_mut()
                .find(|c| c.id == id && c.is_visible_to(user_id))?;

            if creation.is_liked_by(user_id) {
                creation.likes.retain(|liker| liker != user_id);
            } else {
                creation.likes.push(user_id.to_string());
            }
            creation.updated_at = Utc::now();

            Some(creation.clone())
        })
    }

    async fn toggle_publish(&self, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        self.with_creations(|creations: &mut Vec<Creation>| -> Option<Creation> {
            let creation = creations
                .iter_mut()
                .find(|c| c.id == id && c.user_id == user_id)?;

            creation.publish = !creation.publish;
            creation.updated_at = Utc::now();

            Some(creation.clone())
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
