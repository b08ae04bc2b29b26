//! Fairness statistics for a point scheme.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::SUGGESTION_DELTAS;
use crate::error::Result;
use crate::event::EventType;
use crate::points::PointScheme;
use crate::scoring::{score_all_contestants, score_roster, Roster, RosterScores};
use crate::season::Season;

/// Variance below which a sequence is treated as constant.
const VARIANCE_EPSILON: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceMetrics {
    /// Gini coefficient of team totals
    pub gini: f64,
    /// Highest minus lowest team total
    pub spread: f64,
    /// Share of absolute points contributed by each event type
    pub event_contribution: BTreeMap<EventType, f64>,
    /// Winner's points minus the mean contestant's points
    pub winner_advantage: f64,
    /// Pearson correlation between longevity and points
    pub longevity_correlation: f64,
}

/// A single-type point change that lowers team inequality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub event_type: EventType,
    pub delta: i32,
    pub current_points: i32,
    pub suggested_points: i32,
    pub current_gini: f64,
    pub resulting_gini: f64,
}

/// Gini coefficient: mean absolute pairwise difference over `2 * n^2 * mean`.
///
/// Returns 0.0 for an empty sample or a zero mean. A negative mean gives a
/// negative coefficient whose magnitude still measures inequality.
pub fn gini(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.mean();
    if mean == 0.0 {
        return 0.0;
    }
    let pairwise: f64 = values
        .iter()
        .map(|x| values.iter().map(|y| (x - y).abs()).sum::<f64>())
        .sum();
    pairwise / (2.0 * n * n * mean)
}

/// Pearson correlation of two paired sequences.
///
/// Returns 0.0 with fewer than two pairs or when either side is constant.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let var_x = xs.population_variance();
    let var_y = ys.population_variance();
    if var_x < VARIANCE_EPSILON || var_y < VARIANCE_EPSILON {
        return 0.0;
    }
    let r = xs.population_covariance(ys) / (var_x.sqrt() * var_y.sqrt());
    r.clamp(-1.0, 1.0)
}

/// Fraction of absolute points contributed by each event type that occurred.
pub fn event_contribution(season: &Season, scheme: &PointScheme) -> BTreeMap<EventType, f64> {
    let mut absolute: BTreeMap<EventType, f64> = BTreeMap::new();
    for event in &season.events {
        let points = scheme.points(event.event_type) as f64;
        *absolute.entry(event.event_type).or_insert(0.0) += points.abs();
    }
    let total: f64 = absolute.values().sum();
    if total > 0.0 {
        for share in absolute.values_mut() {
            *share /= total;
        }
    }
    absolute
}

/// Winner's points minus the mean over all contestants; 0.0 without a winner.
pub fn winner_advantage(season: &Season, scheme: &PointScheme) -> f64 {
    let scores = score_all_contestants(season, scheme);
    let Some(winner) = season.winner() else {
        return 0.0;
    };
    let totals: Vec<f64> = scores.iter().map(|s| s.total as f64).collect();
    let winner_total = scores
        .iter()
        .find(|s| s.contestant_id == winner.id)
        .map_or(0.0, |s| s.total as f64);
    winner_total - totals.mean()
}

/// Correlation between how long contestants lasted and their points.
pub fn longevity_correlation(season: &Season, scheme: &PointScheme) -> f64 {
    let scores = score_all_contestants(season, scheme);
    let count = season.contestant_count as f64;
    let longevity: Vec<f64> = season
        .contestants
        .iter()
        .map(|c| count - c.finish_placement as f64 + 1.0)
        .collect();
    let points: Vec<f64> = scores.iter().map(|s| s.total as f64).collect();
    pearson_correlation(&longevity, &points)
}

/// Balance metrics for one scored roster.
pub fn analyze_balance(
    season: &Season,
    scores: &RosterScores,
    scheme: &PointScheme,
) -> BalanceMetrics {
    let totals = scores.totals();
    let spread = if totals.is_empty() {
        0.0
    } else {
        Statistics::max(&totals) - Statistics::min(&totals)
    };

    BalanceMetrics {
        gini: gini(&totals),
        spread,
        event_contribution: event_contribution(season, scheme),
        winner_advantage: winner_advantage(season, scheme),
        longevity_correlation: longevity_correlation(season, scheme),
    }
}

/// Search small single-type point changes that reduce team inequality.
///
/// Each event type is tried on its own with every delta in
/// [`SUGGESTION_DELTAS`]; the delta giving the smallest Gini magnitude is
/// kept when it beats the current scheme. Magnitudes keep the search sound
/// for rosters whose mean total is negative. This is a local search: it
/// never combines changes to several types. Results are sorted by resulting
/// Gini magnitude.
pub fn suggest_adjustments(
    season: &Season,
    roster: &Roster,
    scheme: &PointScheme,
) -> Result<Vec<Adjustment>> {
    let current_gini = gini(&score_roster(season, roster, scheme)?.totals());

    let best: Vec<Option<Adjustment>> = EventType::ALL
        .par_iter()
        .map(|&event_type| -> Result<Option<Adjustment>> {
            let mut best: Option<Adjustment> = None;
            for &delta in SUGGESTION_DELTAS.iter() {
                let candidate = scheme.adjusted(event_type, delta);
                let resulting_gini = gini(&score_roster(season, roster, &candidate)?.totals());
                let threshold = best
                    .as_ref()
                    .map_or(current_gini, |b| b.resulting_gini)
                    .abs();
                if resulting_gini.abs() < threshold {
                    best = Some(Adjustment {
                        event_type,
                        delta,
                        current_points: scheme.points(event_type),
                        suggested_points: candidate.points(event_type),
                        current_gini,
                        resulting_gini,
                    });
                }
            }
            Ok(best)
        })
        .collect::<Result<_>>()?;

    let mut suggestions: Vec<Adjustment> = best.into_iter().flatten().collect();
    suggestions.sort_by(|a, b| a.resulting_gini.abs().total_cmp(&b.resulting_gini.abs()));
    debug!(current_gini, suggestions = suggestions.len(), "adjustment search finished");
    Ok(suggestions)
}
