//! Core types shared across Sensei components.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::CATEGORIES;

/// Challenge difficulty tier.
///
/// Canonical tiers are Beginner/Intermediate/Advanced. Older clients still
/// send Easy/Medium/Hard; those parse as aliases. Anything unrecognized
/// falls back to the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Parse a difficulty label. Total: unknown labels map to Beginner.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "intermediate" | "medium" => Self::Intermediate,
            "advanced" | "hard" => Self::Advanced,
            _ => Self::Beginner,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate, pre-computed statistics for a single user.
///
/// Built fresh from the persistent store before achievement evaluation;
/// condition predicates only ever look at these fields, never at raw
/// attempt rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total attempt rows (completed or not)
    pub challenges_attempted: u32,

    /// Completed challenges
    pub challenges_completed: u32,

    /// Lifetime points (challenge points + achievement bonuses)
    pub total_points: i64,

    /// Fastest completed solve in seconds, if any timed solve exists
    pub fastest_solve: Option<f64>,

    /// Completed solves with no wrong attempts (first try)
    pub perfect_solves: u32,

    /// Completions per difficulty tier
    pub beginner_completed: u32,
    pub intermediate_completed: u32,
    pub advanced_completed: u32,

    /// Distinct categories with at least one completion
    pub categories_completed: Vec<String>,

    /// Consecutive active days streak
    pub consecutive_days: u32,
}

impl StatsSnapshot {
    pub fn completed_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Beginner => self.beginner_completed,
            Difficulty::Intermediate => self.intermediate_completed,
            Difficulty::Advanced => self.advanced_completed,
        }
    }

    pub fn distinct_categories(&self) -> usize {
        self.categories_completed.len()
    }

    /// True once every known category has at least one completion
    pub fn all_categories_covered(&self) -> bool {
        self.distinct_categories() >= CATEGORIES.len()
    }
}

/// Achievement data sent to clients (catalog entry or a fresh grant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
}

/// Result of processing one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Whether the submission counted as a completion
    pub success: bool,

    /// Points credited for this attempt (0 when not completed)
    pub points: i64,

    /// Achievements newly granted by this submission, catalog order
    pub achievements: Vec<AchievementInfo>,
}

/// One ranked leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub total_points: i64,
    pub challenges_completed: i64,
}

/// Per-category completion summary in user stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCompletion {
    pub completed: u32,
    /// Percentage toward the "category complete" target, capped at 100
    pub percentage: u32,
}

/// One row of the recent-activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentActivity {
    pub category: String,
    pub difficulty: String,
    pub completed: bool,
    pub attempts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
    pub points: i64,
    /// Unix epoch seconds
    pub timestamp: i64,
}

/// Detailed statistics for a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,

    /// 1-based leaderboard rank (users with strictly more points + 1)
    pub rank: u32,

    pub profile: StatsSnapshot,

    /// Achievements already granted, grant order
    pub achievements: Vec<AchievementInfo>,

    pub categories_completion: BTreeMap<String, CategoryCompletion>,

    pub recent_activity: Vec<RecentActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_labels_roundtrip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_label(d.label()), d);
        }
    }

    #[test]
    fn test_difficulty_aliases() {
        assert_eq!(Difficulty::from_label("easy"), Difficulty::Beginner);
        assert_eq!(Difficulty::from_label("Medium"), Difficulty::Intermediate);
        assert_eq!(Difficulty::from_label("HARD"), Difficulty::Advanced);
        assert_eq!(Difficulty::from_label(" intermediate "), Difficulty::Intermediate);
    }

    #[test]
    fn test_unknown_difficulty_falls_back_to_lowest_tier() {
        assert_eq!(Difficulty::from_label("Nightmare"), Difficulty::Beginner);
        assert_eq!(Difficulty::from_label(""), Difficulty::Beginner);
    }

    #[test]
    fn test_all_categories_covered() {
        let mut snapshot = StatsSnapshot::default();
        assert!(!snapshot.all_categories_covered());

        snapshot.categories_completed =
            CATEGORIES.iter().map(|c| c.to_string()).collect();
        assert!(snapshot.all_categories_covered());
    }
}
