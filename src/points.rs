use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::event::EventType;

/// Partial mapping of event types to point values supplied by a caller.
pub type PointOverrides = BTreeMap<EventType, i32>;

/// Total mapping of event types to point values.
///
/// A scheme is built by overlaying overrides onto the base table and is
/// never mutated afterwards; every adjustment produces a new scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointScheme {
    points: BTreeMap<EventType, i32>,
}

impl Default for PointScheme {
    fn default() -> Self {
        PointScheme::base()
    }
}

impl PointScheme {
    /// Scheme with every event type at its base value.
    pub fn base() -> Self {
        PointScheme {
            points: EventType::ALL.iter().map(|&t| (t, t.base_points())).collect(),
        }
    }

    /// Base scheme with `overrides` laid on top.
    pub fn with_overrides(overrides: &PointOverrides) -> Self {
        let mut scheme = PointScheme::base();
        for (&event_type, &points) in overrides {
            scheme.points.insert(event_type, points);
        }
        scheme
    }

    /// Parse a JSON object such as `{"WINNER": 25, "QUIT": -5}` into a scheme.
    pub fn from_overrides_json(json: &str) -> Result<Self> {
        let overrides: PointOverrides = serde_json::from_str(json)?;
        Ok(PointScheme::with_overrides(&overrides))
    }

    /// Scheme where every type is 0 except `event_type`.
    pub fn only(event_type: EventType, points: i32) -> Self {
        let mut scheme = PointScheme {
            points: EventType::ALL.iter().map(|&t| (t, 0)).collect(),
        };
        scheme.points.insert(event_type, points);
        scheme
    }

    /// Points for an event type.
    pub fn points(&self, event_type: EventType) -> i32 {
        self.points
            .get(&event_type)
            .copied()
            .unwrap_or_else(|| event_type.base_points())
    }

    /// Copy of this scheme with one type shifted by `delta`.
    pub fn adjusted(&self, event_type: EventType, delta: i32) -> Self {
        let mut scheme = self.clone();
        scheme.points.insert(event_type, self.points(event_type) + delta);
        scheme
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventType, i32)> + '_ {
        self.points.iter().map(|(&t, &p)| (t, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_total() {
        let scheme = PointScheme::base();
        assert_eq!(scheme.iter().count(), EventType::ALL.len());
        assert_eq!(scheme.points(EventType::Winner), 20);
        assert_eq!(scheme.points(EventType::Quit), -10);
    }

    #[test]
    fn test_overrides_are_partial() {
        let mut overrides = PointOverrides::new();
        overrides.insert(EventType::ImmunityWin, 8);

        let scheme = PointScheme::with_overrides(&overrides);
        assert_eq!(scheme.points(EventType::ImmunityWin), 8);
        assert_eq!(scheme.points(EventType::Finalist), 10);

        // Base table is untouched by an overlay
        assert_eq!(PointScheme::base().points(EventType::ImmunityWin), 5);
    }

    #[test]
    fn test_adjusted_returns_new_scheme() {
        let scheme = PointScheme::base();
        let adjusted = scheme.adjusted(EventType::CorrectVote, -3);

        assert_eq!(scheme.points(EventType::CorrectVote), 2);
        assert_eq!(adjusted.points(EventType::CorrectVote), -1);
        let changed: Vec<EventType> = adjusted
            .iter()
            .filter(|&(t, p)| p != scheme.points(t))
            .map(|(t, _)| t)
            .collect();
        assert_eq!(changed, vec![EventType::CorrectVote]);
    }

    #[test]
    fn test_from_overrides_json() {
        let scheme = PointScheme::from_overrides_json(r#"{"WINNER": 25, "QUIT": -5}"#).unwrap();
        assert_eq!(scheme.points(EventType::Winner), 25);
        assert_eq!(scheme.points(EventType::Quit), -5);
        assert_eq!(scheme.points(EventType::MadeJury), 3);

        assert!(PointScheme::from_overrides_json(r#"{"NOT_AN_EVENT": 1}"#).is_err());
    }

    #[test]
    fn test_only() {
        let scheme = PointScheme::only(EventType::IdolFound, 4);
        for (event_type, points) in scheme.iter() {
            let expected = if event_type == EventType::IdolFound { 4 } else { 0 };
            assert_eq!(points, expected);
        }
    }
}
