//! Python bindings. Every function takes and returns JSON strings.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::aggregate;
use crate::balance;
use crate::constants::{DEFAULT_MAX_OWNERS, DRAFT_NOISE, DRAFT_WEIGHT_OFFSET};
use crate::draft::{self, DraftConfig};
use crate::error::{EngineError, Result};
use crate::event::EventType;
use crate::mapper::{self, RawSeasonData};
use crate::monte_carlo::{self, MonteCarloConfig};
use crate::points::PointScheme;
use crate::scoring::{self, Roster};
use crate::season::Season;

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn scheme_from(overrides: Option<&str>) -> Result<PointScheme> {
    match overrides {
        Some(json) => PointScheme::from_overrides_json(json),
        None => Ok(PointScheme::base()),
    }
}

fn seasons_from(json: &str) -> Result<Vec<Season>> {
    Ok(serde_json::from_str(json)?)
}

/// Map raw records to a season; returns `{"season": ..., "warnings": [...]}`.
#[pyfunction]
fn build_season(raw_json: &str) -> PyResult<String> {
    let raw: RawSeasonData = serde_json::from_str(raw_json).map_err(EngineError::from)?;
    Ok(to_json(&mapper::build_season(&raw))?)
}

#[pyfunction]
#[pyo3(signature = (season_json, overrides_json = None))]
fn score_contestants(season_json: &str, overrides_json: Option<&str>) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&scoring::score_all_contestants(&season, &scheme))?)
}

#[pyfunction]
#[pyo3(signature = (season_json, roster_json, overrides_json = None))]
fn score_roster(
    season_json: &str,
    roster_json: &str,
    overrides_json: Option<&str>,
) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let roster: Roster = serde_json::from_str(roster_json).map_err(EngineError::from)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&scoring::score_roster(&season, &roster, &scheme)?)?)
}

#[pyfunction]
#[pyo3(signature = (season_json, config_json, seed = None, overrides_json = None))]
fn simulate_draft(
    season_json: &str,
    config_json: &str,
    seed: Option<u64>,
    overrides_json: Option<&str>,
) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let config = DraftConfig::from_json(config_json)?;
    let scheme = scheme_from(overrides_json)?;
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    Ok(to_json(&draft::simulate_draft(&season, &config, &scheme, &mut rng)?)?)
}

/// Release the GIL for the duration of the simulation batch.
#[pyfunction]
fn run_monte_carlo(py: Python<'_>, season_json: &str, config_json: &str) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let config = MonteCarloConfig::from_json(config_json)?;
    let result = py.allow_threads(|| monte_carlo::run_monte_carlo(&season, &config))?;
    Ok(to_json(&result)?)
}

#[pyfunction]
#[pyo3(signature = (season_json, roster_json, overrides_json = None))]
fn analyze_balance(
    season_json: &str,
    roster_json: &str,
    overrides_json: Option<&str>,
) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let roster: Roster = serde_json::from_str(roster_json).map_err(EngineError::from)?;
    let scheme = scheme_from(overrides_json)?;
    let scores = scoring::score_roster(&season, &roster, &scheme)?;
    Ok(to_json(&balance::analyze_balance(&season, &scores, &scheme))?)
}

#[pyfunction]
#[pyo3(signature = (season_json, roster_json, overrides_json = None))]
fn suggest_adjustments(
    py: Python<'_>,
    season_json: &str,
    roster_json: &str,
    overrides_json: Option<&str>,
) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let roster: Roster = serde_json::from_str(roster_json).map_err(EngineError::from)?;
    let scheme = scheme_from(overrides_json)?;
    let adjustments =
        py.allow_threads(|| balance::suggest_adjustments(&season, &roster, &scheme))?;
    Ok(to_json(&adjustments)?)
}

#[pyfunction]
#[pyo3(signature = (season_json, overrides_json = None))]
fn season_summary(season_json: &str, overrides_json: Option<&str>) -> PyResult<String> {
    let season = Season::from_json(season_json)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&aggregate::season_summary(&season, &scheme))?)
}

#[pyfunction]
#[pyo3(signature = (seasons_json, top_n = 10, overrides_json = None))]
fn leaderboard(seasons_json: &str, top_n: usize, overrides_json: Option<&str>) -> PyResult<String> {
    let seasons = seasons_from(seasons_json)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&aggregate::leaderboard(&seasons, &scheme, top_n))?)
}

#[pyfunction]
#[pyo3(signature = (seasons_json, overrides_json = None))]
fn category_trends(seasons_json: &str, overrides_json: Option<&str>) -> PyResult<String> {
    let seasons = seasons_from(seasons_json)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&aggregate::category_trends(&seasons, &scheme))?)
}

#[pyfunction]
#[pyo3(signature = (seasons_json, name, overrides_json = None))]
fn career_profile(
    seasons_json: &str,
    name: &str,
    overrides_json: Option<&str>,
) -> PyResult<String> {
    let seasons = seasons_from(seasons_json)?;
    let scheme = scheme_from(overrides_json)?;
    Ok(to_json(&aggregate::career_profile(&seasons, &scheme, name)?)?)
}

/// Python module definition
#[pymodule]
fn fantasy_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Season construction and scoring
    m.add_function(wrap_pyfunction!(build_season, m)?)?;
    m.add_function(wrap_pyfunction!(score_contestants, m)?)?;
    m.add_function(wrap_pyfunction!(score_roster, m)?)?;

    // Drafting and simulation
    m.add_function(wrap_pyfunction!(simulate_draft, m)?)?;
    m.add_function(wrap_pyfunction!(run_monte_carlo, m)?)?;

    // Balance
    m.add_function(wrap_pyfunction!(analyze_balance, m)?)?;
    m.add_function(wrap_pyfunction!(suggest_adjustments, m)?)?;

    // Cross-season reports
    m.add_function(wrap_pyfunction!(season_summary, m)?)?;
    m.add_function(wrap_pyfunction!(leaderboard, m)?)?;
    m.add_function(wrap_pyfunction!(category_trends, m)?)?;
    m.add_function(wrap_pyfunction!(career_profile, m)?)?;

    // Constants
    m.add("DEFAULT_MAX_OWNERS", DEFAULT_MAX_OWNERS)?;
    m.add("DRAFT_WEIGHT_OFFSET", DRAFT_WEIGHT_OFFSET)?;
    m.add("DRAFT_NOISE", DRAFT_NOISE)?;
    let event_types: Vec<&str> = EventType::ALL.iter().map(|t| t.as_str()).collect();
    m.add("EVENT_TYPES", event_types)?;

    Ok(())
}
