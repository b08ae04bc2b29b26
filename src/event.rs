use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of point-bearing occurrence.
///
/// Variant order is the canonical order used by every report and by the
/// adjustment search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CorrectVote,
    ZeroVotesReceived,
    SurvivedWithVotes,
    FireMakingWin,
    ImmunityWin,
    RewardWin,
    TeamChallengeWin,
    IdolFound,
    IdolPlaySuccess,
    VotedOutWithIdol,
    MadeJury,
    Finalist,
    Winner,
    Quit,
    CausedBlindside,
}

/// Coarse grouping of event types for trend reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Voting,
    Challenge,
    Advantage,
    Placement,
    Penalty,
    Social,
}

impl EventType {
    pub const ALL: [EventType; 15] = [
        EventType::CorrectVote,
        EventType::ZeroVotesReceived,
        EventType::SurvivedWithVotes,
        EventType::FireMakingWin,
        EventType::ImmunityWin,
        EventType::RewardWin,
        EventType::TeamChallengeWin,
        EventType::IdolFound,
        EventType::IdolPlaySuccess,
        EventType::VotedOutWithIdol,
        EventType::MadeJury,
        EventType::Finalist,
        EventType::Winner,
        EventType::Quit,
        EventType::CausedBlindside,
    ];

    /// Points awarded under the base scheme.
    pub fn base_points(self) -> i32 {
        match self {
            EventType::CorrectVote => 2,
            EventType::ZeroVotesReceived => 1,
            EventType::SurvivedWithVotes => 2,
            EventType::FireMakingWin => 5,
            EventType::ImmunityWin => 5,
            EventType::RewardWin => 2,
            EventType::TeamChallengeWin => 1,
            EventType::IdolFound => 3,
            EventType::IdolPlaySuccess => 5,
            EventType::VotedOutWithIdol => -5,
            EventType::MadeJury => 3,
            EventType::Finalist => 10,
            EventType::Winner => 20,
            EventType::Quit => -10,
            EventType::CausedBlindside => 3,
        }
    }

    pub fn category(self) -> EventCategory {
        match self {
            EventType::CorrectVote
            | EventType::ZeroVotesReceived
            | EventType::SurvivedWithVotes => EventCategory::Voting,
            EventType::FireMakingWin
            | EventType::ImmunityWin
            | EventType::RewardWin
            | EventType::TeamChallengeWin => EventCategory::Challenge,
            EventType::IdolFound | EventType::IdolPlaySuccess | EventType::VotedOutWithIdol => {
                EventCategory::Advantage
            }
            EventType::MadeJury | EventType::Finalist | EventType::Winner => {
                EventCategory::Placement
            }
            EventType::Quit => EventCategory::Penalty,
            EventType::CausedBlindside => EventCategory::Social,
        }
    }

    /// Wire name, e.g. `IMMUNITY_WIN`.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::CorrectVote => "CORRECT_VOTE",
            EventType::ZeroVotesReceived => "ZERO_VOTES_RECEIVED",
            EventType::SurvivedWithVotes => "SURVIVED_WITH_VOTES",
            EventType::FireMakingWin => "FIRE_MAKING_WIN",
            EventType::ImmunityWin => "IMMUNITY_WIN",
            EventType::RewardWin => "REWARD_WIN",
            EventType::TeamChallengeWin => "TEAM_CHALLENGE_WIN",
            EventType::IdolFound => "IDOL_FOUND",
            EventType::IdolPlaySuccess => "IDOL_PLAY_SUCCESS",
            EventType::VotedOutWithIdol => "VOTED_OUT_WITH_IDOL",
            EventType::MadeJury => "MADE_JURY",
            EventType::Finalist => "FINALIST",
            EventType::Winner => "WINNER",
            EventType::Quit => "QUIT",
            EventType::CausedBlindside => "CAUSED_BLINDSIDE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point-bearing occurrence attributed to one contestant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub event_type: EventType,
    pub contestant_id: String,
    pub episode: u32,
    /// Value under the base scheme at mapping time
    pub base_points: i32,
    pub description: String,
}

impl ScoringEvent {
    pub fn new(
        event_type: EventType,
        contestant_id: &str,
        episode: u32,
        description: String,
    ) -> Self {
        ScoringEvent {
            event_type,
            contestant_id: contestant_id.to_string(),
            episode,
            base_points: event_type.base_points(),
            description,
        }
    }
}
