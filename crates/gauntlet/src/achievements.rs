//! Achievement catalog and evaluation.
//!
//! The catalog is immutable process-wide configuration. Conditions are a
//! tagged enum checked against a [`StatsSnapshot`], so no executable logic
//! lives in the catalog data itself. Evaluation is a pure predicate pass;
//! granting (persisting + crediting bonus points) is the submission
//! processor's job.

use std::collections::HashSet;

use sensei_common::{AchievementInfo, Difficulty, StatsSnapshot};

/// Condition predicate over a user's aggregate stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// Total completed challenges reaches the threshold
    ChallengesCompleted(u32),
    /// Fastest timed solve is under the given seconds
    FastestSolveUnder(f64),
    /// Completions at one difficulty tier reach the threshold
    DifficultyCompleted(Difficulty, u32),
    /// First-attempt solves reach the threshold
    PerfectSolves(u32),
    /// Distinct completed categories reach the threshold
    DistinctCategories(u32),
    /// Every known category has at least one completion
    AllCategories,
}

impl Condition {
    pub fn holds(&self, stats: &StatsSnapshot) -> bool {
        match *self {
            Self::ChallengesCompleted(n) => stats.challenges_completed >= n,
            Self::FastestSolveUnder(secs) => {
                stats.fastest_solve.is_some_and(|fastest| fastest < secs)
            }
            Self::DifficultyCompleted(difficulty, n) => stats.completed_for(difficulty) >= n,
            Self::PerfectSolves(n) => stats.perfect_solves >= n,
            Self::DistinctCategories(n) => stats.distinct_categories() >= n as usize,
            Self::AllCategories => stats.all_categories_covered(),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub points: i64,
    pub condition: Condition,
}

impl Achievement {
    pub fn info(&self) -> AchievementInfo {
        AchievementInfo {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            points: self.points,
        }
    }
}

/// The full achievement catalog, in grant-announcement order
pub const CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_blood",
        name: "First Blood",
        description: "Solve your first challenge",
        icon: "🩸",
        points: 50,
        condition: Condition::ChallengesCompleted(1),
    },
    Achievement {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Solve a challenge in under 60 seconds",
        icon: "⚡",
        points: 150,
        condition: Condition::FastestSolveUnder(60.0),
    },
    Achievement {
        id: "quick_draw",
        name: "Quick Draw",
        description: "Solve a challenge in under 2 minutes",
        icon: "🏃",
        points: 100,
        condition: Condition::FastestSolveUnder(120.0),
    },
    Achievement {
        id: "advanced_blood",
        name: "Heavy Hitter",
        description: "Complete an Advanced challenge",
        icon: "🔥",
        points: 100,
        condition: Condition::DifficultyCompleted(Difficulty::Advanced, 1),
    },
    Achievement {
        id: "perfect_score",
        name: "Perfect Score",
        description: "Solve a challenge on the first attempt",
        icon: "💯",
        points: 75,
        condition: Condition::PerfectSolves(1),
    },
    Achievement {
        id: "categories_explorer",
        name: "Explorer",
        description: "Complete challenges from at least 3 different categories",
        icon: "🧭",
        points: 125,
        condition: Condition::DistinctCategories(3),
    },
    Achievement {
        id: "beginner_master",
        name: "Beginner Master",
        description: "Solve 5 beginner challenges",
        icon: "🔰",
        points: 100,
        condition: Condition::DifficultyCompleted(Difficulty::Beginner, 5),
    },
    Achievement {
        id: "intermediate_master",
        name: "Intermediate Master",
        description: "Solve 5 intermediate challenges",
        icon: "🥈",
        points: 200,
        condition: Condition::DifficultyCompleted(Difficulty::Intermediate, 5),
    },
    Achievement {
        id: "advanced_master",
        name: "Advanced Master",
        description: "Solve 5 advanced challenges",
        icon: "🥇",
        points: 300,
        condition: Condition::DifficultyCompleted(Difficulty::Advanced, 5),
    },
    Achievement {
        id: "category_master",
        name: "Category Master",
        description: "Solve at least one challenge in each category",
        icon: "🏆",
        points: 500,
        condition: Condition::AllCategories,
    },
];

/// Find a catalog entry by id
pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Return all catalog entries newly qualified by `stats`.
///
/// Already-granted ids are filtered before condition checks so their bonus
/// points can never be credited twice. Output preserves catalog order.
pub fn evaluate<'a>(
    stats: &StatsSnapshot,
    granted: &HashSet<String>,
) -> Vec<&'a Achievement> {
    CATALOG
        .iter()
        .filter(|a| !granted.contains(a.id))
        .filter(|a| a.condition.holds(stats))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(completed: u32) -> StatsSnapshot {
        StatsSnapshot {
            challenges_completed: completed,
            challenges_attempted: completed,
            ..Default::default()
        }
    }

    #[test]
    fn test_catalog_ids_unique() {
        let mut seen = HashSet::new();
        for entry in CATALOG {
            assert!(seen.insert(entry.id), "duplicate id {}", entry.id);
        }
    }

    #[test]
    fn test_first_completion_grants_first_blood_only() {
        let stats = snapshot_with(1);
        let newly = evaluate(&stats, &HashSet::new());
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, "first_blood");
    }

    #[test]
    fn test_granted_ids_are_filtered() {
        let stats = snapshot_with(1);
        let granted = HashSet::from(["first_blood".to_string()]);
        assert!(evaluate(&stats, &granted).is_empty());
    }

    #[test]
    fn test_fast_solve_grants_both_speed_tiers() {
        let stats = StatsSnapshot {
            challenges_completed: 1,
            fastest_solve: Some(45.0),
            ..Default::default()
        };
        let ids: Vec<_> = evaluate(&stats, &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["first_blood", "speed_demon", "quick_draw"]);
    }

    #[test]
    fn test_two_minute_solve_grants_quick_draw_only() {
        let stats = StatsSnapshot {
            challenges_completed: 1,
            fastest_solve: Some(90.0),
            ..Default::default()
        };
        let ids: Vec<_> = evaluate(&stats, &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert!(ids.contains(&"quick_draw"));
        assert!(!ids.contains(&"speed_demon"));
    }

    #[test]
    fn test_untimed_solves_never_qualify_speed_achievements() {
        let stats = snapshot_with(10);
        let ids: Vec<_> = evaluate(&stats, &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert!(!ids.contains(&"speed_demon"));
        assert!(!ids.contains(&"quick_draw"));
    }

    #[test]
    fn test_explorer_fires_on_third_category_not_before() {
        let mut stats = StatsSnapshot {
            challenges_completed: 2,
            categories_completed: vec!["Cryptography".into(), "Forensics".into()],
            ..Default::default()
        };
        assert!(!Condition::DistinctCategories(3).holds(&stats));

        stats.challenges_completed = 3;
        stats.categories_completed.push("OSINT".into());
        assert!(Condition::DistinctCategories(3).holds(&stats));
    }

    #[test]
    fn test_difficulty_masters() {
        let stats = StatsSnapshot {
            challenges_completed: 5,
            beginner_completed: 5,
            ..Default::default()
        };
        let ids: Vec<_> = evaluate(&stats, &HashSet::new())
            .iter()
            .map(|a| a.id)
            .collect();
        assert!(ids.contains(&"beginner_master"));
        assert!(!ids.contains(&"intermediate_master"));
        assert!(!ids.contains(&"advanced_master"));
    }

    #[test]
    fn test_category_master_requires_every_category() {
        let mut stats = StatsSnapshot {
            challenges_completed: 8,
            categories_completed: sensei_common::constants::CATEGORIES[..8]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            ..Default::default()
        };
        assert!(!Condition::AllCategories.holds(&stats));

        stats
            .categories_completed
            .push(sensei_common::constants::CATEGORIES[8].to_string());
        assert!(Condition::AllCategories.holds(&stats));
    }

    #[test]
    fn test_evaluate_is_pure() {
        let stats = snapshot_with(1);
        let granted = HashSet::new();
        let first = evaluate(&stats, &granted);
        let second = evaluate(&stats, &granted);
        assert_eq!(
            first.iter().map(|a| a.id).collect::<Vec<_>>(),
            second.iter().map(|a| a.id).collect::<Vec<_>>()
        );
    }
}
