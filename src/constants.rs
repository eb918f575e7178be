//! Default values and fixed limits for the quiz engine
//!
//! This module contains the timing contract of a round, the defaults of the
//! content selection policy, and the fixed sizes every round must respect.

/// Round timing and shape
pub mod round {
    /// Seconds after the start of a round at which the hint is revealed
    pub const HINT_DELAY_SECS: u64 = 120;
    /// Seconds after the start of a round at which the answer is revealed
    pub const END_DELAY_SECS: u64 = 300;
    /// Number of options presented for every round
    pub const OPTION_COUNT: usize = 5;
    /// Number of wrong options presented for every round
    pub const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;
}

/// Content selection defaults
pub mod selection {
    /// Number of provider attempts before a round start gives up
    pub const RETRY_BUDGET: u32 = 10;
    /// Largest retry budget accepted by the configuration
    pub const MAX_RETRY_BUDGET: u32 = 100;
    /// Rolling recency window in years
    pub const RECENT_YEARS: i32 = 5;
    /// Chance of accepting a candidate regardless of its release year
    pub const BYPASS_PROBABILITY: f64 = 0.10;
    /// Number of provider pages drawn from
    pub const PAGE_COUNT: u32 = 100;
    /// Default entries requested per page
    pub const PER_PAGE: u32 = 25;
    /// Smallest page size accepted by the configuration
    pub const MIN_PER_PAGE: u32 = 5;
    /// Largest page size accepted by the configuration
    pub const MAX_PER_PAGE: u32 = 50;
}

/// Leaderboard rendering
pub mod leaderboard {
    /// Maximum number of rows rendered in a leaderboard message
    pub const LIMIT: usize = 50;
}

/// Curated names used to top up a distractor pool that came up short
pub const FALLBACK_DISTRACTORS: &[&str] = &[
    "Naruto Uzumaki",
    "Mikasa Ackerman",
    "Levi",
    "Rem",
    "Monkey D. Luffy",
    "Goku",
    "Edward Elric",
    "Light Yagami",
    "Lelouch Lamperouge",
    "Spike Spiegel",
    "Saitama",
    "Tanjirou Kamado",
    "Nezuko Kamado",
    "Satoru Gojou",
    "Megumin",
    "Kurisu Makise",
    "Violet Evergarden",
    "Holo",
    "Killua Zoldyck",
    "Rin Tohsaka",
];
