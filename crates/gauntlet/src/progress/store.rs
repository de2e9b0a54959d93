//! Persistent progress state: profiles, attempts, achievement grants, and
//! the leaderboard projection.
//!
//! Every counter mutation is a single `INSERT .. ON CONFLICT .. DO UPDATE`
//! with the arithmetic done in the database, so two concurrent submissions
//! for the same user both land instead of losing an update.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use sensei_common::constants::RECENT_ACTIVITY_LIMIT;
use sensei_common::{
    AchievementInfo, CategoryCompletion, LeaderboardEntry, RecentActivity, SenseiError,
    StatsSnapshot, UserStats,
};

use crate::achievements::{self, Achievement};
use crate::progress::schema;

/// Completions per category before that category counts as 100% done
const CATEGORY_COMPLETE_TARGET: u32 = 5;

pub(crate) fn storage_err(err: sqlx::Error) -> SenseiError {
    SenseiError::Storage(err.to_string())
}

/// One attempt row, append-only
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub user_id: String,
    pub category: String,
    pub challenge: String,
    pub user_answer: String,
    pub attempts: u32,
    pub time_taken: Option<f64>,
    pub completed: bool,
    pub points: i64,
    pub difficulty: String,
    pub created_at: i64,
}

#[derive(Debug, FromRow)]
pub(crate) struct ProfileRow {
    pub total_points: i64,
    pub challenges_completed: i64,
    pub beginner_completed: i64,
    pub intermediate_completed: i64,
    pub advanced_completed: i64,
    pub fastest_time: Option<f64>,
    pub consecutive_days: i64,
    #[allow(dead_code)]
    pub last_active: Option<String>,
}

/// SQLite-backed progress store
#[derive(Clone)]
pub struct ProgressStore {
    pool: SqlitePool,
}

impl ProgressStore {
    /// Open (or create) the database behind `url`.
    ///
    /// A single pooled connection: SQLite allows one writer at a time, and
    /// in-memory databases exist per connection.
    pub async fn connect(url: &str, acquire_timeout: Duration) -> Result<Self, SenseiError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_err)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create missing tables
    pub async fn init_schema(&self) -> Result<(), SenseiError> {
        for statement in schema::ALL {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(storage_err)?;
        }
        tracing::info!("Progress schema initialized");
        Ok(())
    }

    /// Liveness probe for the readiness endpoint
    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// Ranked leaderboard page: points desc, completions breaking ties
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, SenseiError> {
        let rows = sqlx::query(
            "SELECT user_id, username, total_points, challenges_completed
             FROM leaderboard
             ORDER BY total_points DESC, challenges_completed DESC
             LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        let entries = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(LeaderboardEntry {
                    rank: i as u32 + 1,
                    user_id: row.try_get("user_id")?,
                    username: row.try_get("username")?,
                    total_points: row.try_get("total_points")?,
                    challenges_completed: row.try_get("challenges_completed")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(storage_err)?;

        Ok(entries)
    }

    /// Detailed stats for one user. `None` when the user has no profile yet.
    pub async fn user_stats(&self, user_id: &str) -> Result<Option<UserStats>, SenseiError> {
        let mut conn = self.pool.acquire().await.map_err(storage_err)?;

        let Some(_) = profile_row(&mut conn, user_id).await? else {
            return Ok(None);
        };
        let profile = snapshot(&mut conn, user_id).await?;

        let rank: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) + 1
             FROM leaderboard
             WHERE total_points >
                 COALESCE((SELECT total_points FROM leaderboard WHERE user_id = ?1), -1)",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(storage_err)?;

        let achievements = granted_infos(&mut conn, user_id).await?;
        let categories_completion = category_completion(&mut conn, user_id).await?;
        let recent_activity = recent_activity(&mut conn, user_id).await?;

        Ok(Some(UserStats {
            user_id: user_id.to_string(),
            rank: rank.max(1) as u32,
            profile,
            achievements,
            categories_completion,
            recent_activity,
        }))
    }
}

pub(crate) async fn profile_row(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<ProfileRow>, SenseiError> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT total_points, challenges_completed, beginner_completed,
                intermediate_completed, advanced_completed, fastest_time,
                consecutive_days, last_active
         FROM user_profiles WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(storage_err)
}

/// Append one attempt row
pub(crate) async fn record_attempt(
    conn: &mut SqliteConnection,
    record: &AttemptRecord,
) -> Result<(), SenseiError> {
    sqlx::query(
        "INSERT INTO user_attempts (
            user_id, category, challenge, user_answer,
            attempts, time_taken, completed, points, difficulty, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&record.user_id)
    .bind(&record.category)
    .bind(&record.challenge)
    .bind(&record.user_answer)
    .bind(i64::from(record.attempts))
    .bind(record.time_taken)
    .bind(record.completed)
    .bind(record.points)
    .bind(&record.difficulty)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await
    .map_err(storage_err)?;

    Ok(())
}

/// Apply a completed submission to the profile row.
///
/// Upsert with in-database arithmetic. The streak CASE compares the stored
/// `last_active` against the injected today/yesterday dates: +1 on an
/// exactly-one-day gap, unchanged when already active today, otherwise 1.
/// `fastest_time` only moves to a strictly smaller non-null value.
pub(crate) async fn apply_completed(
    conn: &mut SqliteConnection,
    user_id: &str,
    difficulty: sensei_common::Difficulty,
    points: i64,
    time_taken: Option<f64>,
    today: NaiveDate,
) -> Result<(), SenseiError> {
    use sensei_common::Difficulty;

    let yesterday = today.pred_opt().unwrap_or(today);
    let (beginner, intermediate, advanced) = match difficulty {
        Difficulty::Beginner => (1i64, 0i64, 0i64),
        Difficulty::Intermediate => (0, 1, 0),
        Difficulty::Advanced => (0, 0, 1),
    };

    sqlx::query(
        "INSERT INTO user_profiles (
            user_id, total_points, challenges_completed,
            beginner_completed, intermediate_completed, advanced_completed,
            fastest_time, consecutive_days, last_active
        ) VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6, 1, ?7)
        ON CONFLICT (user_id) DO UPDATE SET
            total_points = total_points + excluded.total_points,
            challenges_completed = challenges_completed + 1,
            beginner_completed = beginner_completed + excluded.beginner_completed,
            intermediate_completed = intermediate_completed + excluded.intermediate_completed,
            advanced_completed = advanced_completed + excluded.advanced_completed,
            fastest_time = CASE
                WHEN excluded.fastest_time IS NULL THEN fastest_time
                WHEN fastest_time IS NULL OR excluded.fastest_time < fastest_time
                    THEN excluded.fastest_time
                ELSE fastest_time
            END,
            consecutive_days = CASE
                WHEN last_active = ?8 THEN consecutive_days + 1
                WHEN last_active = ?7 THEN consecutive_days
                ELSE 1
            END,
            last_active = ?7",
    )
    .bind(user_id)
    .bind(points)
    .bind(beginner)
    .bind(intermediate)
    .bind(advanced)
    .bind(time_taken)
    .bind(today.to_string())
    .bind(yesterday.to_string())
    .execute(&mut *conn)
    .await
    .map_err(storage_err)?;

    Ok(())
}

/// Mirror a completed submission into the leaderboard projection,
/// refreshing the stored username
pub(crate) async fn apply_leaderboard(
    conn: &mut SqliteConnection,
    user_id: &str,
    username: &str,
    points: i64,
    now: i64,
) -> Result<(), SenseiError> {
    sqlx::query(
        "INSERT INTO leaderboard (user_id, username, total_points, challenges_completed, last_updated)
         VALUES (?1, ?2, ?3, 1, ?4)
         ON CONFLICT (user_id) DO UPDATE SET
             username = excluded.username,
             total_points = total_points + excluded.total_points,
             challenges_completed = challenges_completed + 1,
             last_updated = excluded.last_updated",
    )
    .bind(user_id)
    .bind(username)
    .bind(points)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(storage_err)?;

    Ok(())
}

/// Build the aggregate snapshot achievement predicates run against.
///
/// Reads current state, never cached: the profile row plus attempt-table
/// aggregates (perfect solves, distinct completed categories).
pub(crate) async fn snapshot(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<StatsSnapshot, SenseiError> {
    let profile = profile_row(&mut *conn, user_id).await?;

    let attempted: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM user_attempts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(storage_err)?;

    let perfect: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_attempts
         WHERE user_id = ?1 AND completed = 1 AND attempts = 1",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(storage_err)?;

    let categories: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT category FROM user_attempts
         WHERE user_id = ?1 AND completed = 1
         ORDER BY category",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_err)?;

    let mut stats = StatsSnapshot {
        challenges_attempted: attempted as u32,
        perfect_solves: perfect as u32,
        categories_completed: categories,
        ..Default::default()
    };

    if let Some(row) = profile {
        stats.challenges_completed = row.challenges_completed as u32;
        stats.total_points = row.total_points;
        stats.fastest_solve = row.fastest_time;
        stats.beginner_completed = row.beginner_completed as u32;
        stats.intermediate_completed = row.intermediate_completed as u32;
        stats.advanced_completed = row.advanced_completed as u32;
        stats.consecutive_days = row.consecutive_days as u32;
    }

    Ok(stats)
}

/// Achievement ids already granted to a user
pub(crate) async fn granted_ids(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<HashSet<String>, SenseiError> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT achievement_id FROM user_achievements WHERE user_id = ?1")
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(storage_err)?;

    Ok(ids.into_iter().collect())
}

/// Persist one achievement grant and credit its bonus points.
///
/// The unique (user_id, achievement_id) pair is the at-most-once guarantee:
/// points are credited only when this call actually inserted the row.
/// Returns whether the grant was new.
pub(crate) async fn grant_achievement(
    conn: &mut SqliteConnection,
    user_id: &str,
    achievement: &Achievement,
    now: i64,
) -> Result<bool, SenseiError> {
    let inserted = sqlx::query(
        "INSERT INTO user_achievements (user_id, achievement_id, achieved_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (user_id, achievement_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(achievement.id)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(storage_err)?
    .rows_affected();

    if inserted == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE user_profiles SET total_points = total_points + ?1 WHERE user_id = ?2")
        .bind(achievement.points)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(storage_err)?;

    sqlx::query("UPDATE leaderboard SET total_points = total_points + ?1 WHERE user_id = ?2")
        .bind(achievement.points)
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(storage_err)?;

    tracing::info!(user_id = %user_id, achievement = %achievement.id, "Achievement granted");

    Ok(true)
}

async fn granted_infos(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<AchievementInfo>, SenseiError> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT achievement_id FROM user_achievements
         WHERE user_id = ?1
         ORDER BY achieved_at, id",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_err)?;

    Ok(ids
        .iter()
        .filter_map(|id| achievements::find(id))
        .map(Achievement::info)
        .collect())
}

async fn category_completion(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<std::collections::BTreeMap<String, CategoryCompletion>, SenseiError> {
    let rows = sqlx::query(
        "SELECT category, COUNT(*) AS completed
         FROM user_attempts
         WHERE user_id = ?1 AND completed = 1
         GROUP BY category",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_err)?;

    let mut counts = std::collections::BTreeMap::new();
    for row in &rows {
        let category: String = row.try_get("category").map_err(storage_err)?;
        let completed: i64 = row.try_get("completed").map_err(storage_err)?;
        counts.insert(category, completed as u32);
    }

    let mut out = std::collections::BTreeMap::new();
    for category in sensei_common::constants::CATEGORIES {
        let completed = counts.get(*category).copied().unwrap_or(0);
        out.insert(
            category.to_string(),
            CategoryCompletion {
                completed,
                percentage: (completed * 100 / CATEGORY_COMPLETE_TARGET).min(100),
            },
        );
    }

    Ok(out)
}

async fn recent_activity(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Vec<RecentActivity>, SenseiError> {
    let rows = sqlx::query(
        "SELECT category, difficulty, completed, attempts, time_taken, points, created_at
         FROM user_attempts
         WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )
    .bind(user_id)
    .bind(i64::from(RECENT_ACTIVITY_LIMIT))
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_err)?;

    rows.iter()
        .map(|row| {
            Ok(RecentActivity {
                category: row.try_get("category")?,
                difficulty: row.try_get("difficulty")?,
                completed: row.try_get("completed")?,
                attempts: row.try_get("attempts")?,
                time_taken: row.try_get("time_taken")?,
                points: row.try_get("points")?,
                timestamp: row.try_get("created_at")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(storage_err)
}
