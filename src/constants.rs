/// Default number of fantasy teams allowed to hold the same contestant
pub const DEFAULT_MAX_OWNERS: usize = 2;

/// Offset added to every draft weight so negative-value contestants stay pickable
pub const DRAFT_WEIGHT_OFFSET: f64 = 30.0;

/// Half-width of the uniform noise added to a contestant's value when drafting
pub const DRAFT_NOISE: f64 = 10.0;

/// Floor for a draft weight
pub const MIN_DRAFT_WEIGHT: f64 = 1.0;

/// Point deltas tried per event type by the adjustment search
pub const SUGGESTION_DELTAS: [i32; 6] = [-3, -2, -1, 1, 2, 3];

/// Substring of a vote-event label that marks a fire-making council
pub const FIRE_MAKING_MARKER: &str = "Fire";

/// Emitted with every mapping result
pub const BLINDSIDE_WARNING: &str =
    "CAUSED_BLINDSIDE events cannot be derived from data (they require subjective judgment) \
     and are never present in mapped output";
