//! Shared constants for Sensei components.

/// Default SQLite database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite://sensei.db";

/// Default Redis connection URL (challenge sessions)
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default Gauntlet HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5000";

/// Challenge session expiry in Redis (30 minutes)
pub const SESSION_TTL_SECS: u64 = 1800;

/// Upstream generation request timeout (seconds)
pub const GENERATOR_TIMEOUT_SECS: u64 = 30;

/// Marker token the judge reply must start with for a submission to count
/// as correct. Anything else is treated as incorrect.
pub const CORRECT_MARKER: &str = "CORRECT";

/// Default leaderboard page size
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Attempt rows returned in the recent-activity feed
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

/// Challenge categories offered by the generator
pub const CATEGORIES: &[&str] = &[
    "Cryptography",
    "Forensics",
    "Web Exploitation",
    "Reverse Engineering",
    "Binary Exploitation",
    "Steganography",
    "OSINT",
    "Networking",
    "Miscellaneous",
];

/// Difficulty tiers, lowest first
pub const DIFFICULTY_LEVELS: &[&str] = &["Beginner", "Intermediate", "Advanced"];

/// Redis key prefixes
pub mod redis_keys {
    /// Challenge session: session:{token}
    pub const SESSION_PREFIX: &str = "session:";
}
