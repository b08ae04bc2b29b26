use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::event::ScoringEvent;

/// One contestant in one season.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: String,
    pub name: String,
    pub tribe: String,
    /// Final placement, 1 = best
    pub finish_placement: u32,
    pub made_jury: bool,
    pub made_final: bool,
    pub is_winner: bool,
}

impl Contestant {
    /// Key linking the same person across seasons.
    pub fn identity(&self) -> String {
        identity_key(&self.name)
    }
}

pub(crate) fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Canonical, read-only season dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    pub name: String,
    pub contestant_count: usize,
    pub episode_count: u32,
    pub contestants: Vec<Contestant>,
    pub events: Vec<ScoringEvent>,
}

impl Season {
    pub fn contestant(&self, id: &str) -> Option<&Contestant> {
        self.contestants.iter().find(|c| c.id == id)
    }

    pub fn winner(&self) -> Option<&Contestant> {
        self.contestants.iter().find(|c| c.is_winner)
    }

    /// Number of episode slots in a per-episode series.
    ///
    /// Covers the declared episode count and any event recorded past it.
    pub fn episode_span(&self) -> usize {
        let latest = self.events.iter().map(|e| e.episode).max().unwrap_or(0);
        self.episode_count.max(latest).max(1) as usize
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Supplies canonical seasons to the engine.
///
/// Implemented by callers over whatever storage they use; the engine itself
/// never touches files or the network.
pub trait SeasonSource {
    /// Season numbers this source can load, ascending.
    fn available_seasons(&self) -> Vec<u32>;

    fn load(&self, season_number: u32) -> Option<Season>;
}

/// Load a season or fail with [`EngineError::SeasonNotFound`].
pub fn fetch_season<S: SeasonSource + ?Sized>(source: &S, season_number: u32) -> Result<Season> {
    source
        .load(season_number)
        .ok_or(EngineError::SeasonNotFound(season_number))
}

/// In-memory [`SeasonSource`].
#[derive(Clone, Debug, Default)]
pub struct SeasonCatalog {
    seasons: BTreeMap<u32, Season>,
}

impl SeasonCatalog {
    pub fn new() -> Self {
        SeasonCatalog::default()
    }

    /// Add or replace a season.
    pub fn insert(&mut self, season: Season) {
        self.seasons.insert(season.season_number, season);
    }
}

impl FromIterator<Season> for SeasonCatalog {
    fn from_iter<I: IntoIterator<Item = Season>>(iter: I) -> Self {
        let mut catalog = SeasonCatalog::new();
        for season in iter {
            catalog.insert(season);
        }
        catalog
    }
}

impl SeasonSource for SeasonCatalog {
    fn available_seasons(&self) -> Vec<u32> {
        self.seasons.keys().copied().collect()
    }

    fn load(&self, season_number: u32) -> Option<Season> {
        self.seasons.get(&season_number).cloned()
    }
}
