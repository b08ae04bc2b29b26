//! Cross-season reports reshaped from already-computed scores.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};
use std::collections::BTreeMap;

use crate::balance::event_contribution;
use crate::error::{EngineError, Result};
use crate::event::{EventCategory, EventType};
use crate::points::PointScheme;
use crate::scoring::score_all_contestants;
use crate::season::{fetch_season, identity_key, Season, SeasonSource};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContestantTotal {
    pub season_number: u32,
    pub contestant_id: String,
    pub name: String,
    pub placement: u32,
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventTypeShare {
    pub event_type: EventType,
    pub category: EventCategory,
    /// Signed points under the scheme
    pub points: i64,
    pub count: usize,
    /// Percentage of the season's absolute points
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season_number: u32,
    pub name: String,
    pub contestant_count: usize,
    pub episode_count: u32,
    pub total_points: i64,
    pub average: f64,
    pub median: f64,
    pub top: Option<ContestantTotal>,
    pub bottom: Option<ContestantTotal>,
    /// Sorted by percentage descending
    pub event_breakdown: Vec<EventTypeShare>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonTrend {
    pub season_number: u32,
    pub name: String,
    /// Percentage of absolute points per category
    pub categories: BTreeMap<EventCategory, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonAppearance {
    pub season_number: u32,
    pub season_name: String,
    pub contestant_id: String,
    pub placement: u32,
    pub total: i64,
    pub cumulative_by_episode: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    pub name: String,
    pub appearances: Vec<SeasonAppearance>,
    pub career_total: i64,
    pub best_placement: u32,
}

/// Load the given seasons, failing on the first one the source lacks.
pub fn load_seasons<S: SeasonSource + ?Sized>(
    source: &S,
    season_numbers: &[u32],
) -> Result<Vec<Season>> {
    season_numbers
        .iter()
        .map(|&number| fetch_season(source, number))
        .collect()
}

/// Load every season the source offers.
pub fn load_all_seasons<S: SeasonSource + ?Sized>(source: &S) -> Result<Vec<Season>> {
    load_seasons(source, &source.available_seasons())
}

fn contestant_totals_in_order(season: &Season, scheme: &PointScheme) -> Vec<ContestantTotal> {
    score_all_contestants(season, scheme)
        .into_iter()
        .zip(&season.contestants)
        .map(|(score, contestant)| ContestantTotal {
            season_number: season.season_number,
            contestant_id: score.contestant_id,
            name: score.name,
            placement: contestant.finish_placement,
            total: score.total,
        })
        .collect()
}

pub fn season_summary(season: &Season, scheme: &PointScheme) -> SeasonSummary {
    let totals = contestant_totals_in_order(season, scheme);
    let values: Vec<f64> = totals.iter().map(|t| t.total as f64).collect();

    let mut top: Option<&ContestantTotal> = None;
    let mut bottom: Option<&ContestantTotal> = None;
    for entry in &totals {
        if top.map_or(true, |t| entry.total > t.total) {
            top = Some(entry);
        }
        if bottom.map_or(true, |b| entry.total < b.total) {
            bottom = Some(entry);
        }
    }

    let shares = event_contribution(season, scheme);
    let mut breakdown: BTreeMap<EventType, (i64, usize)> = BTreeMap::new();
    for event in &season.events {
        let slot = breakdown.entry(event.event_type).or_insert((0, 0));
        slot.0 += scheme.points(event.event_type) as i64;
        slot.1 += 1;
    }
    let mut event_breakdown: Vec<EventTypeShare> = breakdown
        .into_iter()
        .map(|(event_type, (points, count))| EventTypeShare {
            event_type,
            category: event_type.category(),
            points,
            count,
            percentage: shares.get(&event_type).copied().unwrap_or(0.0) * 100.0,
        })
        .collect();
    event_breakdown.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

    let (average, median) = if values.is_empty() {
        (0.0, 0.0)
    } else {
        (values.iter().mean(), Data::new(values.clone()).median())
    };

    SeasonSummary {
        season_number: season.season_number,
        name: season.name.clone(),
        contestant_count: season.contestant_count,
        episode_count: season.episode_count,
        total_points: totals.iter().map(|t| t.total).sum(),
        average,
        median,
        top: top.cloned(),
        bottom: bottom.cloned(),
        event_breakdown,
    }
}

/// Highest contestant totals across seasons.
///
/// Equal totals keep season order, then contestant order.
pub fn leaderboard(seasons: &[Season], scheme: &PointScheme, top_n: usize) -> Vec<ContestantTotal> {
    let mut entries: Vec<ContestantTotal> = seasons
        .iter()
        .flat_map(|season| contestant_totals_in_order(season, scheme))
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries.truncate(top_n);
    entries
}

/// Per-season percentage of absolute points earned in each category.
pub fn category_trends(seasons: &[Season], scheme: &PointScheme) -> Vec<SeasonTrend> {
    seasons
        .iter()
        .map(|season| {
            let mut categories: BTreeMap<EventCategory, f64> = BTreeMap::new();
            for (event_type, share) in event_contribution(season, scheme) {
                *categories.entry(event_type.category()).or_insert(0.0) += share * 100.0;
            }
            SeasonTrend {
                season_number: season.season_number,
                name: season.name.clone(),
                categories,
            }
        })
        .collect()
}

/// Every appearance of a person across seasons, matched by name.
pub fn career_profile(
    seasons: &[Season],
    scheme: &PointScheme,
    name: &str,
) -> Result<CareerProfile> {
    let key = identity_key(name);
    let mut appearances = Vec::new();

    for season in seasons {
        let Some(contestant) = season.contestants.iter().find(|c| c.identity() == key) else {
            continue;
        };
        let Some(score) = score_all_contestants(season, scheme)
            .into_iter()
            .find(|s| s.contestant_id == contestant.id)
        else {
            continue;
        };
        appearances.push(SeasonAppearance {
            season_number: season.season_number,
            season_name: season.name.clone(),
            contestant_id: contestant.id.clone(),
            placement: contestant.finish_placement,
            total: score.total,
            cumulative_by_episode: score.cumulative_by_episode,
        });
    }

    let best_placement = appearances
        .iter()
        .map(|a| a.placement)
        .min()
        .ok_or_else(|| EngineError::ContestantNotFound(name.to_string()))?;

    Ok(CareerProfile {
        name: name.trim().to_string(),
        career_total: appearances.iter().map(|a| a.total).sum(),
        best_placement,
        appearances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{example_season, varied_season};
    use crate::season::SeasonCatalog;

    #[test]
    fn test_season_summary() {
        let season = example_season();
        let summary = season_summary(&season, &PointScheme::base());

        assert_eq!(summary.total_points, 50);
        assert!((summary.average - 12.5).abs() < 1e-12);
        assert!((summary.median - 5.0).abs() < 1e-12);
        assert_eq!(summary.top.as_ref().unwrap().contestant_id, "C1");
        // C3 and C4 tie at zero; the first one wins
        assert_eq!(summary.bottom.as_ref().unwrap().contestant_id, "C3");

        let types: Vec<EventType> = summary.event_breakdown.iter().map(|s| s.event_type).collect();
        assert_eq!(types, vec![EventType::Finalist, EventType::Winner, EventType::ImmunityWin]);
        assert_eq!(summary.event_breakdown[2].count, 2);
    }

    #[test]
    fn test_breakdown_sums_match() {
        let season = varied_season(4);
        let summary = season_summary(&season, &PointScheme::base());

        let points: i64 = summary.event_breakdown.iter().map(|s| s.points).sum();
        assert_eq!(points, summary.total_points);
        let percent: f64 = summary.event_breakdown.iter().map(|s| s.percentage).sum();
        assert!((percent - 100.0).abs() < 1e-9);
        let count: usize = summary.event_breakdown.iter().map(|s| s.count).sum();
        assert_eq!(count, season.events.len());
        for window in summary.event_breakdown.windows(2) {
            assert!(window[0].percentage >= window[1].percentage);
        }
    }

    #[test]
    fn test_leaderboard() {
        let seasons = vec![varied_season(1), varied_season(2)];
        let board = leaderboard(&seasons, &PointScheme::base(), 5);

        assert_eq!(board.len(), 5);
        for window in board.windows(2) {
            assert!(window[0].total >= window[1].total);
        }
        // Identical seasons: ties keep season order
        assert_eq!(board[0].contestant_id, "S1C1");
        assert_eq!(board[1].contestant_id, "S2C1");
        assert_eq!(board[0].total, 41);

        let everything = leaderboard(&seasons, &PointScheme::base(), 100);
        assert_eq!(everything.len(), 16);
    }

    #[test]
    fn test_category_trends() {
        let seasons = vec![example_season(), varied_season(2)];
        let trends = category_trends(&seasons, &PointScheme::base());

        assert_eq!(trends.len(), 2);
        assert!((trends[0].categories[&EventCategory::Placement] - 80.0).abs() < 1e-9);
        assert!((trends[0].categories[&EventCategory::Challenge] - 20.0).abs() < 1e-9);
        for trend in &trends {
            let total: f64 = trend.categories.values().sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_career_profile() {
        let seasons = vec![varied_season(1), example_season(), varied_season(2)];
        let profile = career_profile(&seasons, &PointScheme::base(), " ava ").unwrap();

        assert_eq!(profile.appearances.len(), 2);
        assert_eq!(profile.career_total, 82);
        assert_eq!(profile.best_placement, 1);
        assert_eq!(profile.appearances[1].season_number, 2);
        assert_eq!(*profile.appearances[0].cumulative_by_episode.last().unwrap(), 41);

        assert!(matches!(
            career_profile(&seasons, &PointScheme::base(), "Nobody"),
            Err(EngineError::ContestantNotFound(_))
        ));
    }

    #[test]
    fn test_load_seasons() {
        let catalog: SeasonCatalog = vec![varied_season(1), varied_season(3)].into_iter().collect();
        let all = load_all_seasons(&catalog).unwrap();
        assert_eq!(all.iter().map(|s| s.season_number).collect::<Vec<_>>(), vec![1, 3]);

        assert!(matches!(load_seasons(&catalog, &[1, 2]), Err(EngineError::SeasonNotFound(2))));
    }
}
