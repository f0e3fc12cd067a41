use async_trait::async_trait;

use super::errors::RepositoryError;
use crate::database::DatabasePool;
use crate::models::{SystemStats, UserStats};

/// Repository trait for aggregate counts
#[async_trait]
pub trait StatsRepositoryTrait: Send + Sync {
    async fn system_stats(&self) -> Result<SystemStats, RepositoryError>;

    async fn user_stats(&self, user_id: i64) -> Result<UserStats, RepositoryError>;
}

/// SQLite-backed stats repository
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: DatabasePool,
}

impl StatsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepositoryTrait for StatsRepository {
    async fn system_stats(&self) -> Result<SystemStats, RepositoryError> {
        let conn = self.pool.get()?;
        let stats = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE is_active = 1),
                (SELECT COUNT(*) FROM health_profiles),
                (SELECT COUNT(*) FROM documents),
                (SELECT COUNT(*) FROM foods),
                (SELECT COUNT(*) FROM chat_sessions),
                (SELECT COUNT(*) FROM chat_messages),
                (SELECT COUNT(*) FROM health_plans)",
            [],
            |row| {
                Ok(SystemStats {
                    users: row.get(0)?,
                    health_profiles: row.get(1)?,
                    documents: row.get(2)?,
                    foods: row.get(3)?,
                    chat_sessions: row.get(4)?,
                    chat_messages: row.get(5)?,
                    health_plans: row.get(6)?,
                })
            },
        )?;
        Ok(stats)
    }

    async fn user_stats(&self, user_id: i64) -> Result<UserStats, RepositoryError> {
        let conn = self.pool.get()?;
        let stats = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM health_profiles WHERE user_id = ?1),
                (SELECT COUNT(*) FROM documents d
                    JOIN health_profiles p ON p.id = d.health_profile_id WHERE p.user_id = ?1),
                (SELECT COUNT(*) FROM chat_sessions s
                    JOIN health_profiles p ON p.id = s.health_profile_id WHERE p.user_id = ?1),
                (SELECT COUNT(*) FROM health_plans hp
                    JOIN health_profiles p ON p.id = hp.health_profile_id WHERE p.user_id = ?1)",
            [user_id],
            |row| {
                Ok(UserStats {
                    profiles: row.get(0)?,
                    documents: row.get(1)?,
                    chat_sessions: row.get(2)?,
                    health_plans: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{insert_profile, insert_user, test_pool};

    #[tokio::test]
    async fn counts_follow_ownership() {
        let pool = test_pool();
        let alice = insert_user(&pool, "a@x.io");
        let bob = insert_user(&pool, "b@x.io");
        let profile = insert_profile(&pool, alice, "Main");
        insert_profile(&pool, bob, "Main");
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO chat_sessions (health_profile_id, started_at, last_message_at)
                 VALUES (?1, 'x', 'x')",
                [profile],
            )
            .unwrap();

        let repo = StatsRepository::new(pool);
        let system = repo.system_stats().await.unwrap();
        assert_eq!(system.users, 2);
        assert_eq!(system.health_profiles, 2);
        assert_eq!(system.chat_sessions, 1);

        let stats = repo.user_stats(alice).await.unwrap();
        assert_eq!(stats.profiles, 1);
        assert_eq!(stats.chat_sessions, 1);
        assert_eq!(repo.user_stats(bob).await.unwrap().chat_sessions, 0);
    }
}
