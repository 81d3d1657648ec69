use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::*;

const CREATION_COLUMNS: &str =
    "id, user_id, prompt, content, type, publish, likes, created_at, updated_at";

pub struct CreationQueries;

impl CreationQueries {
    pub async fn insert(pool: &PgPool, creation: &NewCreation) -> Result<Creation> {
        let query = format!(
            r#"
            INSERT INTO creations (user_id, prompt, content, type, publish)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CREATION_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, Creation>(&query)
            .bind(&creation.user_id)
            .bind(&creation.prompt)
            .bind(&creation.content)
            .bind(creation.creation_type.as_str())
            .bind(creation.publish)
            .fetch_one(pool)
            .await?;

        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Creation>> {
        let query = format!("SELECT {CREATION_COLUMNS} FROM creations WHERE id = $1");

        let creation = sqlx::query_as::<_, Creation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(creation)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Creation>> {
        let query = format!(
            "SELECT {CREATION_COLUMNS} FROM creations WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let creations = sqlx::query_as::<_, Creation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(creations)
    }

    pub async fn list_published(pool: &PgPool) -> Result<Vec<Creation>> {
        let query = format!(
            "SELECT {CREATION_COLUMNS} FROM creations WHERE publish = TRUE ORDER BY created_at DESC"
        );

        let creations = sqlx::query_as::<_, Creation>(&query)
            .fetch_all(pool)
            .await?;

        Ok(creations)
    }

    /// Adds or removes `user_id` from the like set in a single statement.
    pub async fn toggle_like(pool: &PgPool, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        let query = format!(
            r#"
            UPDATE creations
            SET likes = CASE
                    WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
                    ELSE array_append(likes, $2)
                END,
                updated_at = NOW()
            WHERE id = $1 AND (publish OR user_id = $2)
            RETURNING {CREATION_COLUMNS}
            "#
        );

        let creation = sqlx::query_as::<_, Creation>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(creation)
    }

    pub async fn toggle_publish(pool: &PgPool, id: Uuid, user_id: &str) -> Result<Option<Creation>> {
        let query = format!(
            r#"
            UPDATE creations
            SET publish = NOT publish, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CREATION_COLUMNS}
            "#
        );

        let creation = sqlx::query_as::<_, Creation>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(creation)
    }
}

pub struct AccountQueries;

impl AccountQueries {
    /// Loads the account, provisioning a free one on first sight.
    pub async fn find_or_create(pool: &PgPool, user_id: &str) -> Result<UserAccount> {
        sqlx::query("INSERT INTO user_accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;

        let row = sqlx::query("SELECT plan, free_usage FROM user_accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        let plan: String = row.try_get("plan")?;
        let free_usage: i32 = row.try_get("free_usage")?;

        Ok(UserAccount::new(
            user_id,
            Plan::parse(&plan),
            u32::try_from(free_usage).unwrap_or(0),
        ))
    }

    /// Increments `free_usage` only while it is below `limit`. Returns the
    /// new counter, or `None` when the limit was already reached.
    pub async fn try_consume(pool: &PgPool, user_id: &str, limit: u32) -> Result<Option<u32>> {
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        let usage: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE user_accounts
            SET free_usage = free_usage + 1, updated_at = NOW()
            WHERE user_id = $1 AND free_usage < $2
            RETURNING free_usage
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_optional(pool)
        .await?;

        Ok(usage.map(|u| u32::try_from(u).unwrap_or(0)))
    }

    pub async fn release(pool: &PgPool, user_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE user_accounts SET free_usage = GREATEST(free_usage - 1, 0), updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn set_plan(pool: &PgPool, user_id: &str, plan: Plan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_accounts (user_id, plan) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET plan = EXCLUDED.plan, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(plan.as_str())
        .execute(pool)
        .await?;

        Ok(())
    }
}
