//! Shared seasons for unit tests.

use crate::event::{EventType, ScoringEvent};
use crate::season::{Contestant, Season};

pub(crate) fn contestant(id: &str, name: &str, placement: u32) -> Contestant {
    Contestant {
        id: id.to_string(),
        name: name.to_string(),
        tribe: if placement % 2 == 0 { "Luzon" } else { "Tagi" }.to_string(),
        finish_placement: placement,
        made_jury: false,
        made_final: false,
        is_winner: false,
    }
}

fn event(event_type: EventType, id: &str, episode: u32) -> ScoringEvent {
    ScoringEvent::new(event_type, id, episode, format!("{} in episode {}", event_type, episode))
}

/// Four contestants; C1 wins over C2, C3 and C4 score nothing.
pub(crate) fn example_season() -> Season {
    let mut alice = contestant("C1", "Alice", 1);
    alice.made_final = true;
    alice.is_winner = true;
    let mut bob = contestant("C2", "Bob", 2);
    bob.made_final = true;

    Season {
        season_number: 1,
        name: "Example".to_string(),
        contestant_count: 4,
        episode_count: 4,
        contestants: vec![alice, bob, contestant("C3", "Carol", 3), contestant("C4", "Dave", 4)],
        events: vec![
            event(EventType::ImmunityWin, "C1", 2),
            event(EventType::ImmunityWin, "C1", 3),
            event(EventType::Winner, "C1", 4),
            event(EventType::Finalist, "C1", 4),
            event(EventType::Finalist, "C2", 4),
        ],
    }
}

/// Eight contestants with a spread of positive and negative events.
pub(crate) fn varied_season(season_number: u32) -> Season {
    let names = ["Ava", "Ben", "Cleo", "Dan", "Eve", "Finn", "Gia", "Hal"];
    let mut contestants: Vec<Contestant> = names
        .iter()
        .enumerate()
        .map(|(i, name)| contestant(&format!("S{}C{}", season_number, i + 1), name, i as u32 + 1))
        .collect();
    contestants[0].is_winner = true;
    for c in contestants.iter_mut().take(3) {
        c.made_final = true;
    }
    for c in contestants.iter_mut().skip(3).take(3) {
        c.made_jury = true;
    }

    let id = |i: usize| format!("S{}C{}", season_number, i);
    let mut events = Vec::new();
    for episode in 1..=6u32 {
        events.push(event(EventType::TeamChallengeWin, &id(1), episode));
        events.push(event(EventType::TeamChallengeWin, &id(4), episode));
        events.push(event(EventType::CorrectVote, &id((episode as usize % 8) + 1), episode));
        events.push(event(EventType::ZeroVotesReceived, &id(2), episode));
    }
    events.push(event(EventType::ImmunityWin, &id(1), 7));
    events.push(event(EventType::ImmunityWin, &id(3), 8));
    events.push(event(EventType::IdolFound, &id(5), 3));
    events.push(event(EventType::IdolPlaySuccess, &id(5), 5));
    events.push(event(EventType::VotedOutWithIdol, &id(8), 2));
    events.push(event(EventType::Quit, &id(7), 4));
    events.push(event(EventType::FireMakingWin, &id(3), 8));
    for i in 4..=6 {
        events.push(event(EventType::MadeJury, &id(i), 9));
    }
    for i in 1..=3 {
        events.push(event(EventType::Finalist, &id(i), 10));
    }
    events.push(event(EventType::Winner, &id(1), 10));

    Season {
        season_number,
        name: format!("Season {}", season_number),
        contestant_count: contestants.len(),
        episode_count: 10,
        contestants,
        events,
    }
}
