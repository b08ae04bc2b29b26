//! Fantasy Core - draft simulation and scoring balance engine for a
//! reality-competition fantasy league.
//!
//! Raw season records are mapped to scoring events, contestants and teams are
//! scored under a point scheme, snake drafts are simulated many times to study
//! outcomes, and the scheme itself is evaluated for fairness. Optional Python
//! bindings are available behind the `python` feature.

pub mod aggregate;
pub mod balance;
pub mod constants;
pub mod draft;
pub mod error;
pub mod event;
pub mod mapper;
pub mod monte_carlo;
pub mod points;
pub mod scoring;
pub mod season;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod fixtures;

pub use aggregate::{
    career_profile, category_trends, leaderboard, load_all_seasons, load_seasons, season_summary,
    CareerProfile, ContestantTotal, EventTypeShare, SeasonAppearance, SeasonSummary, SeasonTrend,
};
pub use balance::{
    analyze_balance, event_contribution, gini, longevity_correlation, pearson_correlation,
    suggest_adjustments, winner_advantage, Adjustment, BalanceMetrics,
};
pub use draft::{
    simulate_draft, simulate_draft_pinned, snake_order, DraftConfig, DraftResult, PickPolicy,
    PickRecord, PinnedRoster,
};
pub use error::{EngineError, Result};
pub use event::{EventCategory, EventType, ScoringEvent};
pub use mapper::{build_season, map_season_events, MappingResult, RawSeasonData, SeasonBuild};
pub use monte_carlo::{
    run_monte_carlo, ContestantDraftStats, DistributionStats, MonteCarloConfig, MonteCarloResult,
    PinnedSummary,
};
pub use points::{PointOverrides, PointScheme};
pub use scoring::{
    contestant_totals, score_all_contestants, score_roster, ContestantScore, Roster, RosterScores,
    TeamScore,
};
pub use season::{fetch_season, Contestant, Season, SeasonCatalog, SeasonSource};
