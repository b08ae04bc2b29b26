use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::balance::{analyze_balance, BalanceMetrics};
use crate::draft::{simulate_draft_pinned, DraftConfig, PinnedRoster};
use crate::error::{EngineError, Result};
use crate::points::{PointOverrides, PointScheme};
use crate::scoring::{contestant_totals, score_roster, Roster, RosterScores};
use crate::season::Season;

/// Monte Carlo configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub num_simulations: usize,
    pub draft: DraftConfig,
    /// Partial point overrides laid over the base scheme
    pub overrides: PointOverrides,
    /// Master seed; None seeds from system entropy
    pub seed: Option<u64>,
    /// Roster forced onto one player in every simulation
    pub pinned: Option<PinnedRoster>,
    /// Run simulations on the rayon thread pool
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            num_simulations: 1000,
            draft: DraftConfig::default(),
            overrides: PointOverrides::new(),
            seed: None,
            pinned: None,
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scheme(&self) -> PointScheme {
        PointScheme::with_overrides(&self.overrides)
    }
}

/// Summary statistics of a numeric sample.
///
/// Percentiles use the nearest-rank method without interpolation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub sample_size: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl DistributionStats {
    /// All fields are 0.0 for an empty sample.
    pub fn from_sample(values: &[f64]) -> Self {
        if values.is_empty() {
            return DistributionStats::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        DistributionStats {
            sample_size: values.len(),
            mean: values.mean(),
            median: Data::new(sorted.clone()).median(),
            std_dev: values.population_std_dev(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p25: percentile_nearest_rank(&sorted, 25.0),
            p75: percentile_nearest_rank(&sorted, 75.0),
        }
    }
}

/// Nearest-rank percentile of an ascending sample; 0.0 when empty.
pub fn percentile_nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((percentile / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// How often a contestant was drafted and how their teams finished.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContestantDraftStats {
    pub contestant_id: String,
    pub name: String,
    pub fantasy_points: i64,
    pub draft_count: usize,
    /// Draft count over all draft slots of all simulations
    pub draft_rate: f64,
    /// Mean 1-based finish rank of teams holding the contestant
    pub average_rank: Option<f64>,
}

/// How the pinned team fared against random opponents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinnedSummary {
    pub player_index: usize,
    pub team_scores: DistributionStats,
    pub mean_rank: f64,
    /// Share of simulations the pinned team finished first
    pub win_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub num_simulations: usize,
    pub contestants: Vec<ContestantDraftStats>,
    /// Distribution of every team total pooled across simulations
    pub team_scores: DistributionStats,
    /// Metrics of the final simulation, as a representative sample
    pub balance: BalanceMetrics,
    pub pinned: Option<PinnedSummary>,
}

/// Per-partition accumulator, merged after the parallel loop.
struct SimulationTally {
    draft_counts: Vec<usize>,
    ranks: Vec<Vec<usize>>,
    team_totals: Vec<f64>,
    pinned_totals: Vec<f64>,
    pinned_ranks: Vec<usize>,
    last: Option<(usize, RosterScores)>,
}

impl SimulationTally {
    fn new(contestant_count: usize) -> Self {
        SimulationTally {
            draft_counts: vec![0; contestant_count],
            ranks: vec![Vec::new(); contestant_count],
            team_totals: Vec::new(),
            pinned_totals: Vec::new(),
            pinned_ranks: Vec::new(),
            last: None,
        }
    }

    fn record(
        &mut self,
        iteration: usize,
        roster: &Roster,
        scores: RosterScores,
        index: &HashMap<&str, usize>,
        pinned_player: Option<usize>,
    ) {
        for (player, picks) in roster.iter().enumerate() {
            let rank = scores.rank_of(player).unwrap_or(roster.len());
            for id in picks {
                if let Some(&ci) = index.get(id.as_str()) {
                    self.draft_counts[ci] += 1;
                    self.ranks[ci].push(rank);
                }
            }
            if pinned_player == Some(player) {
                self.pinned_totals.push(scores.teams[player].total as f64);
                self.pinned_ranks.push(rank);
            }
        }
        self.team_totals.extend(scores.totals());

        if self.last.as_ref().map_or(true, |(i, _)| iteration > *i) {
            self.last = Some((iteration, scores));
        }
    }

    fn merge(mut self, other: SimulationTally) -> SimulationTally {
        for (count, n) in self.draft_counts.iter_mut().zip(other.draft_counts) {
            *count += n;
        }
        for (ranks, more) in self.ranks.iter_mut().zip(other.ranks) {
            ranks.extend(more);
        }
        self.team_totals.extend(other.team_totals);
        self.pinned_totals.extend(other.pinned_totals);
        self.pinned_ranks.extend(other.pinned_ranks);
        self.last = match (self.last, other.last) {
            (Some(a), Some(b)) => Some(if b.0 > a.0 { b } else { a }),
            (a, b) => a.or(b),
        };
        self
    }
}

/// Repeat draft-then-score `num_simulations` times and aggregate.
///
/// Every iteration draws from its own `ChaCha8Rng`, seeded up front from the
/// master seed, so sequential and parallel runs give identical results.
pub fn run_monte_carlo(season: &Season, config: &MonteCarloConfig) -> Result<MonteCarloResult> {
    if config.num_simulations == 0 {
        return Err(EngineError::InvalidConfig(
            "num_simulations must be at least 1".to_string(),
        ));
    }
    config.draft.validate(season.contestants.len())?;

    let scheme = config.scheme();
    let index: HashMap<&str, usize> = season
        .contestants
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();
    let pinned_player = config.pinned.as_ref().map(|p| p.player_index);

    let mut master = match config.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..config.num_simulations).map(|_| master.gen::<u64>()).collect();

    let simulate = |seed: u64| -> Result<(Roster, RosterScores)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let pinned = config.pinned.as_ref();
        let draft = simulate_draft_pinned(season, &config.draft, &scheme, pinned, &mut rng)?;
        let scores = score_roster(season, &draft.roster, &scheme)?;
        Ok((draft.roster, scores))
    };

    let contestant_count = season.contestants.len();
    let tally = if config.parallel {
        seeds
            .par_iter()
            .enumerate()
            .try_fold(
                || SimulationTally::new(contestant_count),
                |mut tally, (i, &seed)| -> Result<SimulationTally> {
                    let (roster, scores) = simulate(seed)?;
                    tally.record(i, &roster, scores, &index, pinned_player);
                    Ok(tally)
                },
            )
            .try_reduce(|| SimulationTally::new(contestant_count), |a, b| Ok(a.merge(b)))?
    } else {
        let mut tally = SimulationTally::new(contestant_count);
        for (i, &seed) in seeds.iter().enumerate() {
            let (roster, scores) = simulate(seed)?;
            tally.record(i, &roster, scores, &index, pinned_player);
        }
        tally
    };

    let slots = config.num_simulations as f64 * config.draft.total_picks() as f64;
    let totals = contestant_totals(season, &scheme);
    let contestants = season
        .contestants
        .iter()
        .enumerate()
        .map(|(ci, c)| {
            let ranks = &tally.ranks[ci];
            ContestantDraftStats {
                contestant_id: c.id.clone(),
                name: c.name.clone(),
                fantasy_points: totals.get(&c.id).copied().unwrap_or(0),
                draft_count: tally.draft_counts[ci],
                draft_rate: tally.draft_counts[ci] as f64 / slots,
                average_rank: if ranks.is_empty() {
                    None
                } else {
                    Some(ranks.iter().sum::<usize>() as f64 / ranks.len() as f64)
                },
            }
        })
        .collect();

    let (_, final_scores) = tally
        .last
        .ok_or_else(|| EngineError::InvalidConfig("no simulation completed".to_string()))?;
    let balance = analyze_balance(season, &final_scores, &scheme);

    let pinned = pinned_player.map(|player_index| {
        let ranks = &tally.pinned_ranks;
        PinnedSummary {
            player_index,
            team_scores: DistributionStats::from_sample(&tally.pinned_totals),
            mean_rank: ranks.iter().sum::<usize>() as f64 / ranks.len().max(1) as f64,
            win_rate: ranks.iter().filter(|&&r| r == 1).count() as f64 / ranks.len().max(1) as f64,
        }
    });

    let team_scores = DistributionStats::from_sample(&tally.team_totals);
    debug!(
        season = season.season_number,
        mean = team_scores.mean,
        std_dev = team_scores.std_dev,
        "pooled team scores"
    );
    info!(
        season = season.season_number,
        simulations = config.num_simulations,
        gini = balance.gini,
        "monte carlo complete"
    );

    Ok(MonteCarloResult {
        num_simulations: config.num_simulations,
        contestants,
        team_scores,
        balance,
        pinned,
    })
}
