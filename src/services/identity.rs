use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    database::{queries::AccountQueries, Database},
    errors::{AppError, Result},
    models::{Plan, UserAccount},
};

/// Read/consume access to the plan and free-usage counter that the
/// identity provider holds for each user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<UserAccount>;

    /// Atomically takes one unit of free usage if the counter is below
    /// `limit`. Returns `false` without changing anything otherwise.
    async fn try_consume(&self, user_id: &str, limit: u32) -> Result<bool>;

    /// Hands back a unit taken by `try_consume`.
    async fn release(&self, user_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct PgIdentityStore {
    database: Database,
}

impl PgIdentityStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn get(&self, user_id: &str) -> Result<UserAccount> {
        AccountQueries::find_or_create(self.database.pool(), user_id).await
    }

    async fn try_consume(&self, user_id: &str, limit: u32) -> Result<bool> {
        let usage = AccountQueries::try_consume(self.database.pool(), user_id, limit).await?;
        if let Some(usage) = usage {
            tracing::debug!(user_id, free_usage = usage, "consumed free usage");
        }
        Ok(usage.is_some())
    }

    async fn release(&self, user_id: &str) -> Result<()> {
        AccountQueries::release(self.database.pool(), user_id).await
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryIdentityStore {
    accounts: Mutex<HashMap<String, UserAccount>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: &str, plan: Plan, free_usage: u32) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(user_id.to_string(), UserAccount::new(user_id, plan, free_usage));
        }
    }

    pub fn usage(&self, user_id: &str) -> Option<u32> {
        self.accounts
            .lock()
            .ok()
            .and_then(|accounts| accounts.get(user_id).map(|a| a.free_usage))
    }

    fn with_accounts<T>(&self, f: impl FnOnce(&mut HashMap<String, UserAccount>) -> T) -> Result<T> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("identity store lock poisoned")))?;
        Ok(f(&mut accounts))
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get(&self, user_id: &str) -> Result<UserAccount> {
        self.with_accounts(|accounts| {
            accounts
                .entry(user_id.to_string())
                .or_insert_with(|| UserAccount::new(user_id, Plan::Free, 0))
                .clone()
        })
    }

    async fn try_consume(&self, user_id: &str, limit: u32) -> Result<bool> {
        self.with_accounts(|accounts| {
            let account = accounts
                .entry(user_id.to_string())
                .or_insert_with(|| UserAccount::new(user_id, Plan::Free, 0));
            if account.free_usage < limit {
                account.free_usage += 1;
                true
            } else {
                false
            }
        })
    }

    async fn release(&self, user_id: &str) -> Result<()> {
        self.with_accounts(|accounts| {
            if let Some(account) = accounts.get_mut(user_id) {
                account.free_usage = account.free_usage.saturating_sub(1);
            }
        })
    }
}
