//! Translation of raw per-episode game records into canonical scoring events.
//!
//! Every rule below is applied once per qualifying record. The mapper does
//! no I/O: callers load and validate raw data, then hand it over as plain
//! structs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

use crate::constants::{BLINDSIDE_WARNING, FIRE_MAKING_MARKER};
use crate::event::{EventType, ScoringEvent};
use crate::season::{Contestant, Season};

/// Raw records for one season, already filtered to that season.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSeasonData {
    pub season_number: u32,
    pub name: String,
    pub episode_count: u32,
    pub contestants: Vec<RawContestant>,
    pub votes: Vec<VoteRecord>,
    pub challenges: Vec<ChallengeRecord>,
    pub advantages: Vec<AdvantageMovement>,
    pub boot_order: Vec<BootOrderEntry>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawContestant {
    pub id: String,
    pub name: String,
    pub tribe: String,
    pub placement: u32,
    /// Free text such as "Sole Survivor", "Quit" or "10th voted out"
    pub result: String,
    pub jury: bool,
    pub finalist: bool,
    pub winner: bool,
}

/// One cast vote at a tribal council.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteRecord {
    pub episode: u32,
    /// Tribal council ordinal within the season
    pub council: u32,
    /// Free-text label of the vote event
    pub vote_event: String,
    pub voter_id: String,
    pub target_id: Option<String>,
    pub voted_out_id: Option<String>,
    pub nullified: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeRecord {
    pub episode: u32,
    pub contestant_id: String,
    pub outcome: String,
    pub individual_immunity: bool,
    pub individual_reward: bool,
}

/// One row of an idol's movement history.
///
/// Raw data repeats a single logical action across several rows (one per
/// affected player), so rows are deduplicated before mapping.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvantageMovement {
    pub contestant_id: String,
    pub episode: u32,
    pub advantage_id: String,
    pub action: String,
    pub votes_nullified: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvantageAction {
    Found,
    Received,
    Played,
    Transferred,
    Expired,
    Other,
}

impl AdvantageMovement {
    pub fn kind(&self) -> AdvantageAction {
        match self.action.trim().to_lowercase().as_str() {
            "found" => AdvantageAction::Found,
            "received" => AdvantageAction::Received,
            "played" => AdvantageAction::Played,
            "transferred" | "gave" | "given" => AdvantageAction::Transferred,
            "expired" | "destroyed" => AdvantageAction::Expired,
            _ => AdvantageAction::Other,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BootOrderEntry {
    pub contestant_id: String,
    /// Episode in which the contestant left the game
    pub episode: u32,
    pub order: u32,
}

/// Mapped events plus data-completeness warnings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MappingResult {
    pub events: Vec<ScoringEvent>,
    pub warnings: Vec<String>,
}

/// Canonical season assembled from raw data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeasonBuild {
    pub season: Season,
    pub warnings: Vec<String>,
}

/// Map every raw record of a season to scoring events.
///
/// Events come back stably sorted by episode. The blindside warning is
/// always the first warning.
pub fn map_season_events(raw: &RawSeasonData) -> MappingResult {
    let mut ctx = MappingContext {
        known: raw.contestants.iter().map(|c| c.id.as_str()).collect(),
        unknown: BTreeSet::new(),
        events: Vec::new(),
        warnings: vec![BLINDSIDE_WARNING.to_string()],
    };

    map_votes(&raw.votes, &mut ctx);
    map_challenges(&raw.challenges, &mut ctx);
    let movements = dedup_movements(&raw.advantages, &mut ctx);
    map_idols(&movements, &mut ctx);
    map_placements(raw, &movements, &mut ctx);

    for id in &ctx.unknown {
        ctx.warnings
            .push(format!("records reference unknown contestant {}; they were skipped", id));
    }
    for warning in ctx.warnings.iter().skip(1) {
        warn!(season = raw.season_number, "{}", warning);
    }

    ctx.events.sort_by_key(|e| e.episode);
    debug!(
        season = raw.season_number,
        events = ctx.events.len(),
        warnings = ctx.warnings.len(),
        "mapped season events"
    );

    MappingResult {
        events: ctx.events,
        warnings: ctx.warnings,
    }
}

/// Map raw data and assemble the canonical [`Season`].
pub fn build_season(raw: &RawSeasonData) -> SeasonBuild {
    let MappingResult { events, warnings } = map_season_events(raw);
    let contestants: Vec<Contestant> = raw
        .contestants
        .iter()
        .map(|c| Contestant {
            id: c.id.clone(),
            name: c.name.clone(),
            tribe: c.tribe.clone(),
            finish_placement: c.placement,
            made_jury: c.jury,
            made_final: c.finalist,
            is_winner: c.winner,
        })
        .collect();

    SeasonBuild {
        season: Season {
            season_number: raw.season_number,
            name: raw.name.clone(),
            contestant_count: contestants.len(),
            episode_count: raw.episode_count,
            contestants,
            events,
        },
        warnings,
    }
}

struct MappingContext<'a> {
    known: HashSet<&'a str>,
    unknown: BTreeSet<String>,
    events: Vec<ScoringEvent>,
    warnings: Vec<String>,
}

impl<'a> MappingContext<'a> {
    /// True when `id` is a contestant of the season; remembers it otherwise.
    fn check(&mut self, id: &str) -> bool {
        if self.known.contains(id) {
            true
        } else {
            self.unknown.insert(id.to_string());
            false
        }
    }

    fn push(&mut self, event_type: EventType, id: &str, episode: u32, description: String) {
        self.events.push(ScoringEvent::new(event_type, id, episode, description));
    }
}

fn map_votes(votes: &[VoteRecord], ctx: &mut MappingContext<'_>) {
    let mut councils: BTreeMap<(u32, u32), Vec<&VoteRecord>> = BTreeMap::new();
    for vote in votes {
        councils
            .entry((vote.episode, vote.council))
            .or_default()
            .push(vote);
    }

    for ((episode, council), records) in councils {
        let eliminated = records.iter().find_map(|r| r.voted_out_id.as_deref());
        let Some(eliminated) = eliminated else {
            ctx.warnings.push(format!(
                "tribal council {} (episode {}) has no eliminated contestant; \
                 its votes were not scored",
                council, episode
            ));
            continue;
        };
        // An unknown eliminated id still decides which votes were correct
        ctx.check(eliminated);

        // Unknown ids are reported once and never receive events
        let mut attendees: Vec<&str> = Vec::new();
        for record in &records {
            let ids = std::iter::once(record.voter_id.as_str()).chain(record.target_id.as_deref());
            for id in ids {
                if !attendees.contains(&id) && ctx.check(id) {
                    attendees.push(id);
                }
            }
        }

        if records
            .iter()
            .any(|r| r.vote_event.contains(FIRE_MAKING_MARKER))
        {
            for &id in attendees.iter().filter(|&&id| id != eliminated) {
                ctx.push(
                    EventType::FireMakingWin,
                    id,
                    episode,
                    format!("Won fire-making at tribal council {}", council),
                );
            }
            continue;
        }

        let mut received: HashMap<&str, u32> = HashMap::new();
        for record in records.iter().filter(|r| !r.nullified) {
            if let Some(target) = record.target_id.as_deref() {
                *received.entry(target).or_insert(0) += 1;
            }
        }

        for record in &records {
            let correct = !record.nullified && record.target_id.as_deref() == Some(eliminated);
            if correct && attendees.contains(&record.voter_id.as_str()) {
                ctx.push(
                    EventType::CorrectVote,
                    &record.voter_id,
                    episode,
                    format!("Voted for {} at tribal council {}", eliminated, council),
                );
            }
        }

        for &id in attendees.iter().filter(|&&id| id != eliminated) {
            match received.get(id).copied().unwrap_or(0) {
                0 => ctx.push(
                    EventType::ZeroVotesReceived,
                    id,
                    episode,
                    format!("Received no votes at tribal council {}", council),
                ),
                n => ctx.push(
                    EventType::SurvivedWithVotes,
                    id,
                    episode,
                    format!("Survived {} vote(s) at tribal council {}", n, council),
                ),
            }
        }
    }
}

fn map_challenges(challenges: &[ChallengeRecord], ctx: &mut MappingContext<'_>) {
    for record in challenges {
        if !record.outcome.trim().eq_ignore_ascii_case("won") || !ctx.check(&record.contestant_id) {
            continue;
        }
        let (event_type, label) = if record.individual_immunity {
            (EventType::ImmunityWin, "individual immunity")
        } else if record.individual_reward {
            (EventType::RewardWin, "individual reward")
        } else {
            (EventType::TeamChallengeWin, "tribal challenge")
        };
        ctx.push(
            event_type,
            &record.contestant_id,
            record.episode,
            format!("Won {} in episode {}", label, record.episode),
        );
    }
}

/// Collapse repeated rows of one logical action, keeping first-seen order.
fn dedup_movements(
    movements: &[AdvantageMovement],
    ctx: &mut MappingContext<'_>,
) -> Vec<AdvantageMovement> {
    let mut seen: HashMap<(String, u32, String), usize> = HashMap::new();
    let mut unique: Vec<AdvantageMovement> = Vec::new();

    for movement in movements {
        if !ctx.check(&movement.contestant_id) {
            continue;
        }
        let key = (
            movement.contestant_id.clone(),
            movement.episode,
            movement.action.trim().to_lowercase(),
        );
        match seen.get(&key) {
            Some(&index) => {
                let kept = &mut unique[index];
                kept.votes_nullified = kept.votes_nullified.max(movement.votes_nullified);
            }
            None => {
                seen.insert(key, unique.len());
                unique.push(movement.clone());
            }
        }
    }

    unique
}

fn map_idols(movements: &[AdvantageMovement], ctx: &mut MappingContext<'_>) {
    for movement in movements {
        match movement.kind() {
            AdvantageAction::Found => ctx.push(
                EventType::IdolFound,
                &movement.contestant_id,
                movement.episode,
                format!("Found an idol in episode {}", movement.episode),
            ),
            AdvantageAction::Played if movement.votes_nullified > 0 => ctx.push(
                EventType::IdolPlaySuccess,
                &movement.contestant_id,
                movement.episode,
                format!("Played an idol nullifying {} vote(s)", movement.votes_nullified),
            ),
            _ => {}
        }
    }
}

/// Idols a contestant still holds after everything up to `episode`.
fn idols_held(movements: &[AdvantageMovement], contestant_id: &str, episode: u32) -> i64 {
    movements
        .iter()
        .filter(|m| m.contestant_id == contestant_id && m.episode <= episode)
        .map(|m| match m.kind() {
            AdvantageAction::Found | AdvantageAction::Received => 1,
            AdvantageAction::Played | AdvantageAction::Transferred | AdvantageAction::Expired => -1,
            AdvantageAction::Other => 0,
        })
        .sum()
}

fn map_placements(
    raw: &RawSeasonData,
    movements: &[AdvantageMovement],
    ctx: &mut MappingContext<'_>,
) {
    let mut boot_episode: HashMap<&str, u32> = HashMap::new();
    for entry in &raw.boot_order {
        if ctx.check(&entry.contestant_id) {
            boot_episode.insert(entry.contestant_id.as_str(), entry.episode);
        }
    }

    let latest_record = raw
        .votes
        .iter()
        .map(|v| v.episode)
        .chain(raw.challenges.iter().map(|c| c.episode))
        .chain(raw.boot_order.iter().map(|b| b.episode))
        .max()
        .unwrap_or(0);
    let final_episode = raw.episode_count.max(latest_record);

    for contestant in &raw.contestants {
        let id = contestant.id.as_str();
        let episode = if contestant.winner || contestant.finalist {
            final_episode
        } else {
            boot_episode.get(id).copied().unwrap_or_else(|| {
                debug!(contestant = id, "no boot order entry; using final episode");
                final_episode
            })
        };

        if contestant.winner {
            ctx.push(EventType::Winner, id, episode, "Won the season".to_string());
        }
        if contestant.finalist {
            ctx.push(
                EventType::Finalist,
                id,
                episode,
                "Reached the final tribal council".to_string(),
            );
        }
        if contestant.jury {
            ctx.push(EventType::MadeJury, id, episode, "Made the jury".to_string());
        }
        if contestant.result.to_lowercase().contains("quit") {
            ctx.push(EventType::Quit, id, episode, "Quit the game".to_string());
        }
        if !contestant.winner && !contestant.finalist && idols_held(movements, id, episode) > 0 {
            ctx.push(
                EventType::VotedOutWithIdol,
                id,
                episode,
                "Left the game holding an idol".to_string(),
            );
        }
    }
}
