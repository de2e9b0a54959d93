//! Submission processing.
//!
//! One submission is one unit of work: attempt record, profile upsert,
//! leaderboard upsert, and any achievement grants commit or roll back
//! together. Partial credit is never retained.

use chrono::NaiveDate;

use sensei_common::{Difficulty, SenseiError, SubmissionOutcome};

use crate::achievements;
use crate::progress::store::{
    self, storage_err, AttemptRecord, ProgressStore,
};
use crate::scoring;

/// A validated-enough submission, verdict already decided upstream.
///
/// `completed` comes from the external judge; the processor never re-derives
/// correctness.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub username: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub challenge: String,
    pub user_answer: String,
    pub attempts: u32,
    pub time_taken: Option<f64>,
    pub completed: bool,
}

/// Process one submission against the store.
///
/// `today` drives the activity streak; callers pass the current UTC date,
/// tests inject fixed dates. `now` is the attempt/grant timestamp.
pub async fn process_submission(
    store: &ProgressStore,
    submission: &SubmissionRequest,
    today: NaiveDate,
    now: i64,
) -> Result<SubmissionOutcome, SenseiError> {
    if submission.user_id.trim().is_empty() {
        return Err(SenseiError::Validation("user_id is required".into()));
    }
    if submission.category.trim().is_empty() {
        return Err(SenseiError::Validation("category is required".into()));
    }

    let points = if submission.completed {
        scoring::compute_points(
            submission.difficulty,
            submission.attempts,
            submission.time_taken,
        )
    } else {
        0
    };

    let mut tx = store.pool().begin().await.map_err(storage_err)?;

    store::record_attempt(
        &mut tx,
        &AttemptRecord {
            user_id: submission.user_id.clone(),
            category: submission.category.clone(),
            challenge: submission.challenge.clone(),
            user_answer: submission.user_answer.clone(),
            attempts: submission.attempts.max(1),
            time_taken: submission.time_taken,
            completed: submission.completed,
            points,
            difficulty: submission.difficulty.label().to_string(),
            created_at: now,
        },
    )
    .await?;

    let mut newly_granted = Vec::new();

    if submission.completed {
        store::apply_completed(
            &mut tx,
            &submission.user_id,
            submission.difficulty,
            points,
            submission.time_taken,
            today,
        )
        .await?;

        store::apply_leaderboard(&mut tx, &submission.user_id, &submission.username, points, now)
            .await?;

        // Fresh aggregate reads inside the same transaction
        let stats = store::snapshot(&mut tx, &submission.user_id).await?;
        let granted = store::granted_ids(&mut tx, &submission.user_id).await?;

        for achievement in achievements::evaluate(&stats, &granted) {
            if store::grant_achievement(&mut tx, &submission.user_id, achievement, now).await? {
                newly_granted.push(achievement.info());
            }
        }
    }

    tx.commit().await.map_err(storage_err)?;

    tracing::debug!(
        user_id = %submission.user_id,
        completed = submission.completed,
        points,
        new_achievements = newly_granted.len(),
        "Submission processed"
    );

    Ok(SubmissionOutcome {
        success: submission.completed,
        points,
        achievements: newly_granted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn test_store() -> ProgressStore {
        let store = ProgressStore::connect("sqlite::memory:", Duration::from_secs(5))
            .await
            .unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn submission(user: &str, category: &str, completed: bool) -> SubmissionRequest {
        SubmissionRequest {
            user_id: user.to_string(),
            username: user.to_string(),
            category: category.to_string(),
            difficulty: Difficulty::Beginner,
            challenge: "decode the intercepted message".to_string(),
            user_answer: "flag{...}".to_string(),
            attempts: 2,
            time_taken: None,
            completed,
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn profile(store: &ProgressStore, user: &str) -> Option<store::ProfileRow> {
        let mut conn = store.pool().acquire().await.unwrap();
        store::profile_row(&mut conn, user).await.unwrap()
    }

    async fn leaderboard_points(store: &ProgressStore, user: &str) -> Option<i64> {
        sqlx::query_scalar("SELECT total_points FROM leaderboard WHERE user_id = ?1")
            .bind(user)
            .fetch_optional(store.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_completion_creates_profile_and_grants_first_blood() {
        let store = test_store().await;

        let outcome =
            process_submission(&store, &submission("mallory", "Forensics", true), day("2026-03-01"), 100)
                .await
                .unwrap();

        // base 100 - one extra attempt penalty
        assert!(outcome.success);
        assert_eq!(outcome.points, 75);
        assert_eq!(outcome.achievements.len(), 1);
        assert_eq!(outcome.achievements[0].id, "first_blood");

        let row = profile(&store, "mallory").await.unwrap();
        assert_eq!(row.challenges_completed, 1);
        assert_eq!(row.beginner_completed, 1);
        // attempt points + first_blood bonus
        assert_eq!(row.total_points, 75 + 50);
    }

    #[tokio::test]
    async fn test_repeated_grant_never_double_credits() {
        let store = test_store().await;
        let today = day("2026-03-01");

        process_submission(&store, &submission("eve", "OSINT", true), today, 100)
            .await
            .unwrap();
        let points_after_first = profile(&store, "eve").await.unwrap().total_points;

        let outcome = process_submission(&store, &submission("eve", "OSINT", true), today, 101)
            .await
            .unwrap();
        // second completion in the same category yields no new achievements
        assert!(outcome.achievements.iter().all(|a| a.id != "first_blood"));

        let row = profile(&store, "eve").await.unwrap();
        assert_eq!(row.total_points, points_after_first + outcome.points);
    }

    #[tokio::test]
    async fn test_leaderboard_matches_profile_after_each_submission() {
        let store = test_store().await;
        let today = day("2026-03-01");

        for (i, category) in ["Cryptography", "Networking", "OSINT"].iter().enumerate() {
            process_submission(&store, &submission("trent", category, true), today, 100 + i as i64)
                .await
                .unwrap();

            let row = profile(&store, "trent").await.unwrap();
            assert_eq!(
                leaderboard_points(&store, "trent").await,
                Some(row.total_points)
            );
        }
    }

    #[tokio::test]
    async fn test_incorrect_submission_changes_nothing() {
        let store = test_store().await;

        let outcome = process_submission(
            &store,
            &submission("walter", "Steganography", false),
            day("2026-03-01"),
            100,
        )
        .await
        .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.points, 0);
        assert!(outcome.achievements.is_empty());
        assert!(profile(&store, "walter").await.is_none());
        assert_eq!(leaderboard_points(&store, "walter").await, None);

        // the attempt itself is still on record
        let attempts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_attempts WHERE user_id = 'walter'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_explorer_fires_on_third_distinct_category() {
        let store = test_store().await;
        let today = day("2026-03-01");

        let first = process_submission(&store, &submission("peggy", "Cryptography", true), today, 1)
            .await
            .unwrap();
        assert!(first.achievements.iter().all(|a| a.id != "categories_explorer"));

        let second = process_submission(&store, &submission("peggy", "Forensics", true), today, 2)
            .await
            .unwrap();
        assert!(second.achievements.iter().all(|a| a.id != "categories_explorer"));

        let third = process_submission(&store, &submission("peggy", "OSINT", true), today, 3)
            .await
            .unwrap();
        assert!(third.achievements.iter().any(|a| a.id == "categories_explorer"));
    }

    #[tokio::test]
    async fn test_streak_increments_resets_and_holds() {
        let store = test_store().await;

        process_submission(&store, &submission("victor", "OSINT", true), day("2026-03-01"), 1)
            .await
            .unwrap();
        assert_eq!(profile(&store, "victor").await.unwrap().consecutive_days, 1);

        // next day: +1
        process_submission(&store, &submission("victor", "OSINT", true), day("2026-03-02"), 2)
            .await
            .unwrap();
        assert_eq!(profile(&store, "victor").await.unwrap().consecutive_days, 2);

        // same day again: unchanged
        process_submission(&store, &submission("victor", "OSINT", true), day("2026-03-02"), 3)
            .await
            .unwrap();
        assert_eq!(profile(&store, "victor").await.unwrap().consecutive_days, 2);

        // gap: reset to 1
        process_submission(&store, &submission("victor", "OSINT", true), day("2026-03-05"), 4)
            .await
            .unwrap();
        assert_eq!(profile(&store, "victor").await.unwrap().consecutive_days, 1);
    }

    #[tokio::test]
    async fn test_fastest_time_only_improves() {
        let store = test_store().await;
        let today = day("2026-03-01");

        let mut sub = submission("carol", "Networking", true);
        sub.time_taken = Some(400.0);
        process_submission(&store, &sub, today, 1).await.unwrap();
        assert_eq!(profile(&store, "carol").await.unwrap().fastest_time, Some(400.0));

        sub.time_taken = Some(200.0);
        process_submission(&store, &sub, today, 2).await.unwrap();
        assert_eq!(profile(&store, "carol").await.unwrap().fastest_time, Some(200.0));

        sub.time_taken = Some(900.0);
        process_submission(&store, &sub, today, 3).await.unwrap();
        assert_eq!(profile(&store, "carol").await.unwrap().fastest_time, Some(200.0));

        sub.time_taken = None;
        process_submission(&store, &sub, today, 4).await.unwrap();
        assert_eq!(profile(&store, "carol").await.unwrap().fastest_time, Some(200.0));
    }

    #[tokio::test]
    async fn test_fast_first_attempt_grants_speed_and_perfect() {
        let store = test_store().await;

        let mut sub = submission("dave", "Cryptography", true);
        sub.attempts = 1;
        sub.time_taken = Some(45.0);

        let outcome = process_submission(&store, &sub, day("2026-03-01"), 1)
            .await
            .unwrap();

        // base 100 + time bonus 50
        assert_eq!(outcome.points, 150);
        let ids: Vec<_> = outcome.achievements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["first_blood", "speed_demon", "quick_draw", "perfect_score"]
        );
    }

    #[tokio::test]
    async fn test_missing_user_id_is_rejected_without_persistence() {
        let store = test_store().await;

        let mut sub = submission("", "Cryptography", true);
        sub.user_id = "  ".to_string();

        let err = process_submission(&store, &sub, day("2026-03-01"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SenseiError::Validation(_)));

        let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_attempts")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(attempts, 0);
    }

    #[tokio::test]
    async fn test_user_stats_and_leaderboard_views() {
        let store = test_store().await;
        let today = day("2026-03-01");

        let mut sub = submission("alice", "Cryptography", true);
        sub.attempts = 1;
        sub.time_taken = Some(30.0);
        process_submission(&store, &sub, today, 1).await.unwrap();

        process_submission(&store, &submission("bob", "Forensics", true), today, 2)
            .await
            .unwrap();
        process_submission(&store, &submission("bob", "Forensics", false), today, 3)
            .await
            .unwrap();

        let board = store.leaderboard(10).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, "alice");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].user_id, "bob");
        assert_eq!(board[1].rank, 2);

        let stats = store.user_stats("bob").await.unwrap().unwrap();
        assert_eq!(stats.rank, 2);
        assert_eq!(stats.profile.challenges_attempted, 2);
        assert_eq!(stats.profile.challenges_completed, 1);
        assert!(stats.achievements.iter().any(|a| a.id == "first_blood"));
        assert_eq!(stats.recent_activity.len(), 2);
        assert_eq!(stats.categories_completion["Forensics"].completed, 1);
        assert_eq!(stats.categories_completion["Forensics"].percentage, 20);

        assert!(store.user_stats("nobody").await.unwrap().is_none());
    }
}
