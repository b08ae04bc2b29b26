use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{EngineError, Result};
use crate::event::EventType;
use crate::points::PointScheme;
use crate::season::Season;

/// Contestant ids per player index, in pick order.
pub type Roster = Vec<Vec<String>>;

/// Points earned by one contestant under one scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContestantScore {
    pub contestant_id: String,
    pub name: String,
    pub total: i64,
    pub by_event_type: BTreeMap<EventType, i64>,
    /// Running total after each episode; index 0 is episode 1
    pub cumulative_by_episode: Vec<i64>,
    pub event_count: usize,
}

/// Points earned by one fantasy team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub player_index: usize,
    pub total: i64,
    pub contestants: Vec<ContestantScore>,
    pub cumulative_by_episode: Vec<i64>,
}

/// Scores for every team in a roster plus their ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterScores {
    pub teams: Vec<TeamScore>,
    /// Player indices by total descending; ties keep player order
    pub ranking: Vec<usize>,
}

impl RosterScores {
    pub fn totals(&self) -> Vec<f64> {
        self.teams.iter().map(|t| t.total as f64).collect()
    }

    /// 1-based finish rank of a player.
    pub fn rank_of(&self, player_index: usize) -> Option<usize> {
        self.ranking.iter().position(|&p| p == player_index).map(|i| i + 1)
    }
}

/// Score every contestant of the season, in season order.
pub fn score_all_contestants(season: &Season, scheme: &PointScheme) -> Vec<ContestantScore> {
    let span = season.episode_span();
    let mut scores: Vec<ContestantScore> = season
        .contestants
        .iter()
        .map(|c| ContestantScore {
            contestant_id: c.id.clone(),
            name: c.name.clone(),
            total: 0,
            by_event_type: BTreeMap::new(),
            cumulative_by_episode: vec![0; span],
            event_count: 0,
        })
        .collect();
    let index: HashMap<&str, usize> = season
        .contestants
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    for event in &season.events {
        let Some(&i) = index.get(event.contestant_id.as_str()) else {
            continue;
        };
        let points = scheme.points(event.event_type) as i64;
        let score = &mut scores[i];
        score.total += points;
        score.event_count += 1;
        *score.by_event_type.entry(event.event_type).or_insert(0) += points;
        // Per-episode deltas for now, accumulated below
        let slot = (event.episode.max(1) as usize - 1).min(span - 1);
        score.cumulative_by_episode[slot] += points;
    }

    for score in &mut scores {
        let mut running = 0;
        for value in score.cumulative_by_episode.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    scores
}

/// Total points per contestant id.
pub fn contestant_totals(season: &Season, scheme: &PointScheme) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> =
        season.contestants.iter().map(|c| (c.id.clone(), 0)).collect();
    for event in &season.events {
        if let Some(total) = totals.get_mut(&event.contestant_id) {
            *total += scheme.points(event.event_type) as i64;
        }
    }
    totals
}

/// Score every team of a roster.
///
/// Fails with [`EngineError::ContestantNotFound`] when a roster names an id
/// that is not part of the season.
pub fn score_roster(
    season: &Season,
    roster: &Roster,
    scheme: &PointScheme,
) -> Result<RosterScores> {
    let all = score_all_contestants(season, scheme);
    let by_id: HashMap<&str, &ContestantScore> =
        all.iter().map(|s| (s.contestant_id.as_str(), s)).collect();
    let span = season.episode_span();

    let mut teams = Vec::with_capacity(roster.len());
    for (player_index, picks) in roster.iter().enumerate() {
        let mut contestants = Vec::with_capacity(picks.len());
        let mut cumulative = vec![0i64; span];
        for id in picks {
            let score = by_id
                .get(id.as_str())
                .ok_or_else(|| EngineError::ContestantNotFound(id.clone()))?;
            for (slot, value) in cumulative.iter_mut().zip(&score.cumulative_by_episode) {
                *slot += value;
            }
            contestants.push((*score).clone());
        }
        teams.push(TeamScore {
            player_index,
            total: contestants.iter().map(|c| c.total).sum(),
            contestants,
            cumulative_by_episode: cumulative,
        });
    }

    Ok(RosterScores {
        ranking: rank_teams(&teams),
        teams,
    })
}

fn rank_teams(teams: &[TeamScore]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..teams.len()).collect();
    // sort_by is stable, so equal totals keep player order
    ranking.sort_by(|&a, &b| teams[b].total.cmp(&teams[a].total));
    ranking
}
