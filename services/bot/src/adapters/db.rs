//! services/bot/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `MemberDirectory` and `StreakRepository` ports from the `core` crate.
//! It handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use streak_core::domain::{Group, GroupMember, GroupMembership, User};
use streak_core::ports::{MemberDirectory, PortError, PortResult, StreakRepository};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the persistence ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "user_id, name, username, streak, attempts, maximum_days, all_days";

#[derive(FromRow)]
struct UserRecord {
    user_id: i64,
    name: String,
    username: Option<String>,
    streak: DateTime<Utc>,
    attempts: i32,
    maximum_days: i64,
    all_days: i64,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            name: self.name,
            username: self.username,
            streak_start: self.streak,
            attempts: self.attempts,
            maximum_days: self.maximum_days,
            all_days: self.all_days,
        }
    }
}

#[derive(FromRow)]
struct GroupMemberRecord {
    user_id: i64,
    name: String,
    username: Option<String>,
    streak: DateTime<Utc>,
    is_banned: bool,
}
impl GroupMemberRecord {
    fn to_domain(self) -> GroupMember {
        GroupMember {
            user_id: self.user_id,
            display_name: self.name,
            handle: self.username,
            streak_start: self.streak,
            is_banned: self.is_banned,
        }
    }
}

#[derive(FromRow)]
struct MembershipRecord {
    user_id: i64,
    group_id: i64,
    is_banned: bool,
}
impl MembershipRecord {
    fn to_domain(self) -> GroupMembership {
        GroupMembership {
            user_id: self.user_id,
            group_id: self.group_id,
            is_banned: self.is_banned,
        }
    }
}

#[derive(FromRow)]
struct GroupRecord {
    group_id: i64,
    autodelete: bool,
}
impl GroupRecord {
    fn to_domain(self) -> Group {
        Group {
            group_id: self.group_id,
            autodelete: self.autodelete,
        }
    }
}

//=========================================================================================
// `MemberDirectory` Trait Implementation
//=========================================================================================

#[async_trait]
impl MemberDirectory for DbAdapter {
    async fn query_group_members(&self, group_id: i64) -> PortResult<Vec<GroupMember>> {
        let records = sqlx::query_as::<_, GroupMemberRecord>(
            "SELECT u.user_id, u.name, u.username, u.streak, gu.is_banned \
             FROM users u JOIN group_users gu ON gu.user_id = u.user_id \
             WHERE gu.group_id = $1 \
             ORDER BY u.streak ASC, u.user_id ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `StreakRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl StreakRepository for DbAdapter {
    async fn get_user(&self, user_id: i64) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1) LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_user(&self, user: &User) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (user_id, name, username, streak, attempts, maximum_days, all_days) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.username)
        .bind(user.streak_start)
        .bind(user.attempts)
        .bind(user.maximum_days)
        .bind(user.all_days)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn save_streak(&self, user: &User) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE users SET streak = $2, attempts = $3, maximum_days = $4, all_days = $5 WHERE user_id = $1",
        )
        .bind(user.user_id)
        .bind(user.streak_start)
        .bind(user.attempts)
        .bind(user.maximum_days)
        .bind(user.all_days)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user.user_id)));
        }
        Ok(())
    }

    async fn sync_identity(&self, user_id: i64, name: &str, username: Option<&str>) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, username = $3 \
             WHERE user_id = $1 AND (name IS DISTINCT FROM $2 OR username IS DISTINCT FROM $3)",
        )
        .bind(user_id)
        .bind(name)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user_data(&self, user_id: i64) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        sqlx::query("DELETE FROM group_users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)
    }

    async fn get_membership(&self, user_id: i64, group_id: i64) -> PortResult<Option<GroupMembership>> {
        let record = sqlx::query_as::<_, MembershipRecord>(
            "SELECT user_id, group_id, is_banned FROM group_users WHERE user_id = $1 AND group_id = $2",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(MembershipRecord::to_domain))
    }

    async fn add_membership(&self, user_id: i64, group_id: i64) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO group_users (user_id, group_id) VALUES ($1, $2) ON CONFLICT (user_id, group_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn set_banned(&self, user_id: i64, group_id: i64, is_banned: bool) -> PortResult<()> {
        let result = sqlx::query("UPDATE group_users SET is_banned = $3 WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .bind(is_banned)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "User {} is not on the scoreboard of group {}",
                user_id, group_id
            )));
        }
        Ok(())
    }

    async fn get_or_create_group(&self, group_id: i64) -> PortResult<Group> {
        sqlx::query("INSERT INTO groups (group_id) VALUES ($1) ON CONFLICT (group_id) DO NOTHING")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        let record = sqlx::query_as::<_, GroupRecord>("SELECT group_id, autodelete FROM groups WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => PortError::NotFound(format!("Group {} not found", group_id)),
                _ => PortError::Unexpected(e.to_string()),
            })?;
        Ok(record.to_domain())
    }

    async fn set_autodelete(&self, group_id: i64, autodelete: bool) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO groups (group_id, autodelete) VALUES ($1, $2) \
             ON CONFLICT (group_id) DO UPDATE SET autodelete = EXCLUDED.autodelete",
        )
        .bind(group_id)
        .bind(autodelete)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }
}
