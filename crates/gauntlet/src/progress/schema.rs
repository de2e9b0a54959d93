//! Table definitions for the progress store.

pub const ATTEMPTS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS user_attempts (
        id             INTEGER     PRIMARY KEY AUTOINCREMENT,
        user_id        TEXT        NOT NULL,
        category       TEXT        NOT NULL,
        challenge      TEXT        NOT NULL,
        user_answer    TEXT        NOT NULL,
        attempts       INTEGER     NOT NULL,
        time_taken     REAL,
        completed      INTEGER     NOT NULL,
        points         INTEGER     NOT NULL,
        difficulty     TEXT        NOT NULL,
        created_at     INTEGER     NOT NULL
    )";

pub const ATTEMPTS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_attempts_user ON user_attempts (user_id)";

pub const PROFILES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS user_profiles (
        user_id                TEXT        PRIMARY KEY,
        total_points           INTEGER     NOT NULL    DEFAULT 0,
        challenges_completed   INTEGER     NOT NULL    DEFAULT 0,
        beginner_completed     INTEGER     NOT NULL    DEFAULT 0,
        intermediate_completed INTEGER     NOT NULL    DEFAULT 0,
        advanced_completed     INTEGER     NOT NULL    DEFAULT 0,
        fastest_time           REAL,
        consecutive_days       INTEGER     NOT NULL    DEFAULT 0,
        last_active            TEXT
    )";

pub const ACHIEVEMENTS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS user_achievements (
        id             INTEGER     PRIMARY KEY AUTOINCREMENT,
        user_id        TEXT        NOT NULL,
        achievement_id TEXT        NOT NULL,
        achieved_at    INTEGER     NOT NULL,

        UNIQUE (user_id, achievement_id)
    )";

pub const LEADERBOARD_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS leaderboard (
        user_id               TEXT        PRIMARY KEY,
        username              TEXT        NOT NULL,
        total_points          INTEGER     NOT NULL    DEFAULT 0,
        challenges_completed  INTEGER     NOT NULL    DEFAULT 0,
        last_updated          INTEGER     NOT NULL
    )";

/// All statements needed to bring a fresh database up to date
pub const ALL: &[&str] = &[
    ATTEMPTS_SCHEMA,
    ATTEMPTS_USER_INDEX,
    PROFILES_SCHEMA,
    ACHIEVEMENTS_SCHEMA,
    LEADERBOARD_SCHEMA,
];
